//! sv-migrate - Migration runner for schemaver
//!
//! Ties endpoint resolution, the version store and the script catalog
//! together into ordered, version-gated script application.

pub mod error;
pub mod report;
pub mod runner;
pub mod state;

pub use error::{ErrorKind, MigrateError, MigrateResult};
pub use report::{AppliedScript, MigrationReport};
pub use runner::{MigrationRunner, RunOptions};
pub use state::RunPhase;
