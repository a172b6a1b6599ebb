//! Error types for sv-core

use thiserror::Error;

/// Core error type for schemaver
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Required secret missing from the environment
    #[error("[C003] Environment variable '{var}' is required")]
    MissingSecret { var: String },

    /// C004: Scripts directory does not exist
    #[error("[C004] Scripts directory not found: {path}")]
    ScriptsDirNotFound { path: String },

    /// C005: Two scripts declare the same catalog version
    #[error("[C005] Duplicate script version {version}: {path1} and {path2}")]
    DuplicateScriptVersion {
        version: String,
        path1: String,
        path2: String,
    },

    /// C006: A version string could not be parsed
    #[error("[C006] Invalid schema version '{value}': expected <MAJOR>.<MINOR>")]
    InvalidVersion { value: String },

    /// C007: Unknown environment name
    #[error("[C007] Unknown environment '{value}': expected dev, qa or prod")]
    InvalidEnvironment { value: String },

    /// C008: IO error with file path context
    #[error("[C008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C009: YAML parse error
    #[error("[C009] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
