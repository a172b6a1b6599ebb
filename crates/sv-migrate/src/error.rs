//! Error types for sv-migrate

use sv_cloud::CloudError;
use sv_core::{CoreError, SchemaVersion};
use sv_db::DbError;
use thiserror::Error;

/// Broad failure categories an operator acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad setup: missing secret, scripts, or invalid config. Nothing was applied.
    Configuration,
    /// Endpoint lookup or connection failure
    Connectivity,
    /// The persisted version could not be read
    StoreRead,
    /// A script failed and was rolled back
    ScriptExecution,
    /// A script committed but its version was not recorded (drift)
    VersionAdvance,
}

/// A failed migration run. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Invalid configuration or script catalog (M001)
    #[error("[M001] {0}")]
    Configuration(#[from] CoreError),

    /// The scripts directory holds no matching scripts (M002)
    #[error("[M002] No DDL scripts found in {dir} matching {pattern}")]
    NoScriptsFound { dir: String, pattern: String },

    /// Endpoint lookup failed (M003)
    #[error("[M003] Could not get database endpoint: {0}")]
    EndpointLookup(#[from] CloudError),

    /// The database could not be reached (M004)
    #[error("[M004] Could not connect to database at {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: DbError,
    },

    /// Reading the persisted version failed (M005)
    #[error("[M005] Could not read the database version: {0}")]
    StoreRead(#[source] DbError),

    /// A script failed to execute (M006)
    #[error("[M006] Failed to execute script v{version} ({file}): {source}")]
    ScriptExecution {
        version: SchemaVersion,
        file: String,
        #[source]
        source: DbError,
    },

    /// A script committed but the version write failed (M007)
    #[error("[M007] Script v{version} was applied but the database version could not be updated: {source}")]
    VersionAdvance {
        version: SchemaVersion,
        #[source]
        source: DbError,
    },
}

impl MigrateError {
    /// Category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::Configuration(_) | MigrateError::NoScriptsFound { .. } => {
                ErrorKind::Configuration
            }
            MigrateError::EndpointLookup(_) | MigrateError::Connection { .. } => {
                ErrorKind::Connectivity
            }
            MigrateError::StoreRead(_) => ErrorKind::StoreRead,
            MigrateError::ScriptExecution { .. } => ErrorKind::ScriptExecution,
            MigrateError::VersionAdvance { .. } => ErrorKind::VersionAdvance,
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
