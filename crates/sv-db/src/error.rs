//! Error types for sv-db

use thiserror::Error;

/// Version store errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not open a connection (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Script execution failed and was rolled back (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Reading the version record failed (D003)
    #[error("[D003] Version read failed: {0}")]
    ReadError(String),

    /// Writing the version record failed (D004)
    #[error("[D004] Version write failed: {0}")]
    WriteError(String),

    /// Endpoint kind does not fit the backend (D005)
    #[error("[D005] {backend} cannot connect to endpoint {endpoint}")]
    UnsupportedEndpoint { backend: String, endpoint: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
