//! Ledger domain models: transactions, categories, budgets and the owning account.

pub mod account;
pub mod budget;
pub mod category;
pub mod period;
pub mod transaction;

pub use account::{Account, UNKNOWN_CATEGORY};
pub use budget::{Budget, BudgetStatus, DEFAULT_ALERT_PERCENT};
pub use category::Category;
pub use period::{BudgetPeriod, DateWindow, TimeDimension};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
