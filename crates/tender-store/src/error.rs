//! Error types for tender storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The table the lookup ran against.
        entity: &'static str,
        /// The key that was looked up.
        id: String,
    },

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}
