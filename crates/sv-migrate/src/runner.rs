//! The migration runner.
//!
//! One run resolves the endpoint, checks connectivity, reads the persisted
//! schema version, scans the script catalog and applies every script whose
//! catalog version is above the running version, in ascending order. Each
//! script commits in its own transaction and the version row is advanced
//! right after. The first failure aborts the run.
//!
//! Runs against the same database must be serialized externally; the
//! runner takes no lock.

use crate::error::{MigrateError, MigrateResult};
use crate::report::{AppliedScript, MigrationReport};
use crate::state::RunPhase;
use std::path::PathBuf;
use std::time::Instant;
use sv_cloud::EndpointResolver;
use sv_core::{load_scripts, short_checksum, Environment, SchemaVersion, ScriptPattern};
use sv_db::{StoreConnector, VersionStore};

/// What a run targets
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Target environment
    pub environment: Environment,
    /// Cloud region
    pub region: String,
    /// Directory holding the DDL scripts
    pub scripts_dir: PathBuf,
    /// Script file-name pattern
    pub pattern: ScriptPattern,
}

/// Applies pending DDL scripts to one environment's database
pub struct MigrationRunner {
    resolver: Box<dyn EndpointResolver>,
    connector: Box<dyn StoreConnector>,
    options: RunOptions,
    phase: RunPhase,
}

impl MigrationRunner {
    /// Create a runner from an endpoint resolver and a store connector
    pub fn new(
        resolver: Box<dyn EndpointResolver>,
        connector: Box<dyn StoreConnector>,
        options: RunOptions,
    ) -> Self {
        Self {
            resolver,
            connector,
            options,
            phase: RunPhase::Start,
        }
    }

    /// Phase the last run ended in (`Start` before any run)
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Apply every pending script
    pub async fn run(&mut self) -> MigrateResult<MigrationReport> {
        self.execute(false).await
    }

    /// Report what `run` would apply without changing the database
    pub async fn plan(&mut self) -> MigrateResult<MigrationReport> {
        self.execute(true).await
    }

    async fn execute(&mut self, dry_run: bool) -> MigrateResult<MigrationReport> {
        self.phase = RunPhase::Start;
        let result = self.execute_phases(dry_run).await;
        match &result {
            Ok(_) => self.enter(RunPhase::Done),
            Err(e) => {
                log::error!("Migration failed during {}: {}", self.phase, e);
                self.enter(RunPhase::Failed);
            }
        }
        result
    }

    async fn execute_phases(&mut self, dry_run: bool) -> MigrateResult<MigrationReport> {
        let environment = self.options.environment;
        log::info!(
            "Starting database migration for environment: {} ({})",
            environment,
            self.options.region
        );
        if !dry_run {
            log::warn!(
                "No lock is taken against concurrent migrations; \
                 make sure no other run targets this database"
            );
        }

        self.enter(RunPhase::ResolvingEndpoint);
        let endpoint = self
            .resolver
            .resolve(environment, &self.options.region)
            .await?;
        log::info!("Database endpoint: {}", endpoint);

        self.enter(RunPhase::ConnectivityCheck);
        let store = self
            .connector
            .connect(&endpoint)
            .map_err(|source| MigrateError::Connection {
                endpoint: endpoint.to_string(),
                source,
            })?;
        store
            .check_connection()
            .await
            .map_err(|source| MigrateError::Connection {
                endpoint: endpoint.to_string(),
                source,
            })?;
        log::info!("Database connection successful ({})", store.db_type());

        self.enter(RunPhase::ReadingVersion);
        let persisted = read_persisted_version(store.as_ref()).await?;
        let baseline = match persisted {
            Some(version) => {
                log::info!("Current database version: {}", version);
                version
            }
            None => {
                log::info!(
                    "No version info found, starting from version {}",
                    SchemaVersion::BASELINE
                );
                SchemaVersion::BASELINE
            }
        };

        self.enter(RunPhase::Scanning);
        let scripts = load_scripts(&self.options.scripts_dir, &self.options.pattern)?;
        if scripts.is_empty() {
            return Err(MigrateError::NoScriptsFound {
                dir: self.options.scripts_dir.display().to_string(),
                pattern: self.options.pattern.display(),
            });
        }
        log::info!(
            "Found {} DDL scripts: {}",
            scripts.len(),
            scripts
                .iter()
                .map(|s| s.version().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut report = MigrationReport::new(endpoint.to_string(), persisted, baseline);
        let mut current = baseline;

        for (index, script) in scripts.iter().enumerate() {
            let version = script.version();
            if version <= current {
                log::info!("Skipping script version {} (already applied)", version);
                report.skipped.push(version);
                continue;
            }

            if let Some(declared) = script.version_mismatch() {
                log::warn!(
                    "{} declares #database_version={} but its file name says {}; using {}",
                    script.entry.file_name(),
                    declared,
                    version,
                    version
                );
            }

            if dry_run {
                log::info!(
                    "Would apply script version {} ({})",
                    version,
                    script.entry.file_name()
                );
                report.pending.push(version);
                continue;
            }

            self.enter(RunPhase::Applying(index));
            log::info!(
                "Executing script version {} ({}, sha256 {})",
                version,
                script.entry.file_name(),
                short_checksum(&script.checksum)
            );
            let started = Instant::now();
            store.apply_script(&script.sql).await.map_err(|source| {
                MigrateError::ScriptExecution {
                    version,
                    file: script.entry.file_name(),
                    source,
                }
            })?;
            let elapsed = started.elapsed();

            self.enter(RunPhase::Advancing(index));
            if let Err(source) = store.write_version(version).await {
                log::error!(
                    "Script version {} is committed but the recorded version is still {}; \
                     the next run will apply it again",
                    version,
                    current
                );
                return Err(MigrateError::VersionAdvance { version, source });
            }
            current = version;
            log::info!("Successfully migrated to version {}", version);

            report.applied.push(AppliedScript {
                version,
                file: script.entry.file_name(),
                checksum: script.checksum.clone(),
                elapsed,
            });
        }

        report.final_version = current;
        if report.is_up_to_date() {
            log::info!("Database is up to date at version {}", current);
        } else if dry_run {
            log::info!(
                "{} script(s) pending above version {}",
                report.pending.len(),
                current
            );
        } else {
            log::info!(
                "Migration completed: {} script(s) applied, database at version {}",
                report.applied.len(),
                current
            );
        }
        Ok(report)
    }

    fn enter(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        log::debug!("Migration phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// `None` when the version table is missing or holds no row
async fn read_persisted_version(
    store: &dyn VersionStore,
) -> MigrateResult<Option<SchemaVersion>> {
    if !store.probe_schema().await.map_err(MigrateError::StoreRead)? {
        log::info!("Version table does not exist yet");
        return Ok(None);
    }
    store.read_version().await.map_err(MigrateError::StoreRead)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
