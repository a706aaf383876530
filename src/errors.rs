use thiserror::Error;
use uuid::Uuid;

/// Error type that captures storage and configuration failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Reminder runtime is no longer running")]
    RuntimeStopped,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
