//! sv-core - Core library for schemaver
//!
//! This crate provides the schema version type, the migration script
//! catalog, deployment environments and endpoints, and configuration
//! parsing shared by all schemaver components.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod environment;
pub mod error;
pub mod version;

pub use catalog::{
    extract_declared_version, list_scripts, load_scripts, MigrationScript, ScriptEntry,
    ScriptPattern,
};
pub use checksum::{script_checksum, short_checksum};
pub use config::{Config, DatabaseConfig, VersionTableConfig, DATABASE_VERSION_COMPONENT};
pub use environment::{Endpoint, Environment};
pub use error::{CoreError, CoreResult};
pub use version::SchemaVersion;
