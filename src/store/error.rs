//! Transaction Store Errors

/// Errors that can occur in the transaction store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped to a domain value
    #[error("Invalid row data: {0}")]
    InvalidRow(String),
}

/// Store Result type
pub type StoreResult<T> = Result<T, StoreError>;
