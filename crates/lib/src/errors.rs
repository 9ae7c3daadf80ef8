use thiserror::Error;

/// Errors raised by the storage and record layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    /// Required input is missing, empty or malformed.
    #[error("{0}")]
    Validation(String),
    /// The row does not exist or is not owned by the caller. The two cases are
    /// deliberately reported the same way.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Transaction rolled back: {0}")]
    TransactionFailed(String),
    #[error("Failed to (de)serialize stored JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}
