//! Error types for sv-cloud

use thiserror::Error;

/// Cloud lookup errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// No managed cluster with this identifier (A001)
    #[error("[A001] Database cluster '{cluster}' not found")]
    EndpointNotFound { cluster: String },

    /// Cluster exists but reports no endpoint (A002)
    #[error("[A002] Database cluster '{cluster}' found but no endpoint available")]
    EndpointUnavailable { cluster: String },

    /// External command exited unsuccessfully (A003)
    #[error("[A003] '{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// External command could not be started (A004)
    #[error("[A004] Failed to run '{program}': {source}")]
    CommandSpawn {
        program: String,
        source: std::io::Error,
    },

    /// Command output was not the expected JSON (A005)
    #[error("[A005] Unexpected response from '{program}': {source}")]
    InvalidResponse {
        program: String,
        source: serde_json::Error,
    },
}

/// Result type alias for CloudError
pub type CloudResult<T> = Result<T, CloudError>;
