//! sv-db - Version store layer for schemaver
//!
//! This crate provides the `VersionStore` trait and implementations
//! for PostgreSQL (the Aurora target) and DuckDB (local rehearsal).

pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod traits;

pub use duckdb::{DuckDbBackend, DuckDbConnector};
pub use error::{DbError, DbResult};
pub use postgres::{PgSettings, PostgresBackend, PostgresConnector};
pub use traits::{StoreConnector, VersionStore, VersionTable};
