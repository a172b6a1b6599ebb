//! Outcome of a migration run

use std::time::Duration;
use sv_core::SchemaVersion;

/// A script applied during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedScript {
    /// Catalog version
    pub version: SchemaVersion,
    /// Script file name
    pub file: String,
    /// SHA-256 of the script text
    pub checksum: String,
    /// Execution time of the script transaction
    pub elapsed: Duration,
}

/// Summary of a completed run (or plan)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Endpoint the run targeted
    pub endpoint: String,
    /// Version read from the store before the run, if any
    pub persisted_version: Option<SchemaVersion>,
    /// Starting point for comparisons (persisted version or baseline)
    pub baseline: SchemaVersion,
    /// Scripts applied, in order
    pub applied: Vec<AppliedScript>,
    /// Scripts that a plan would apply; always empty for a real run
    pub pending: Vec<SchemaVersion>,
    /// Scripts at or below the running version
    pub skipped: Vec<SchemaVersion>,
    /// Version recorded in the store when the run finished
    pub final_version: SchemaVersion,
}

impl MigrationReport {
    pub(crate) fn new(
        endpoint: String,
        persisted_version: Option<SchemaVersion>,
        baseline: SchemaVersion,
    ) -> Self {
        Self {
            endpoint,
            persisted_version,
            baseline,
            applied: Vec::new(),
            pending: Vec::new(),
            skipped: Vec::new(),
            final_version: baseline,
        }
    }

    /// Versions applied, in order
    pub fn applied_versions(&self) -> Vec<SchemaVersion> {
        self.applied.iter().map(|a| a.version).collect()
    }

    /// Whether the run (or plan) leaves the schema unchanged
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty() && self.pending.is_empty()
    }
}
