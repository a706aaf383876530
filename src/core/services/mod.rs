pub mod budget_service;
pub mod report_service;
pub mod transaction_service;

pub use budget_service::BudgetService;
pub use report_service::{ChartData, ReportService, ReportType, StatisticsData};
pub use transaction_service::TransactionService;

use uuid::Uuid;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
}
