//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use sv_cloud::{AwsCliResolver, EndpointResolver, StaticResolver};
use sv_core::{Config, Endpoint};
use sv_db::{DuckDbConnector, PgSettings, PostgresConnector, StoreConnector};
use sv_migrate::{MigrationRunner, RunOptions};

use crate::cli::{GlobalArgs, TargetArgs};

/// Loaded configuration and the directory it is relative to
pub(crate) struct Project {
    pub config: Config,
    pub root: PathBuf,
}

impl Project {
    /// Scripts directory, honoring a command-line override
    pub fn scripts_dir(&self, dir_override: Option<&Path>) -> PathBuf {
        match dir_override {
            Some(dir) => dir.to_path_buf(),
            None => self.config.scripts_dir_absolute(&self.root),
        }
    }
}

/// Load the config from `--config` or the project directory
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);

    let config = if let Some(config_path) = &global.config {
        Config::load(Path::new(config_path)).context("Failed to load configuration file")?
    } else {
        Config::load_from_dir(&root).context("Failed to load project configuration")?
    };

    Ok(Project { config, root })
}

/// Build a runner for the target selected on the command line.
///
/// For the cluster target the password is read here, so a missing secret
/// fails before any lookup or connection is attempted.
pub(crate) fn build_runner(project: &Project, target: &TargetArgs) -> Result<MigrationRunner> {
    let config = &project.config;
    let options = RunOptions {
        environment: target.environment.unwrap_or(config.environment),
        region: target
            .region
            .clone()
            .unwrap_or_else(|| config.region.clone()),
        scripts_dir: project.scripts_dir(target.scripts_dir.as_deref()),
        pattern: config.script_pattern()?,
    };

    let (resolver, connector): (Box<dyn EndpointResolver>, Box<dyn StoreConnector>) =
        if let Some(path) = &target.duckdb {
            log::debug!("Targeting local DuckDB file {}", path.display());
            (
                Box::new(StaticResolver::new(Endpoint::File(path.clone()))),
                Box::new(DuckDbConnector::new(config.version_table.clone())),
            )
        } else {
            let settings = PgSettings {
                database: config.database.name.clone(),
                user: config.database.user.clone(),
                password: config.database.password()?,
                connect_timeout: config.database.connect_timeout(),
            };
            let resolver: Box<dyn EndpointResolver> = match &target.endpoint {
                Some(value) => Box::new(StaticResolver::new(Endpoint::parse_host_port(
                    value,
                    config.database.port,
                )?)),
                None => Box::new(AwsCliResolver::new(
                    config.cluster_identifier.clone(),
                    config.database.port,
                )),
            };
            (
                resolver,
                Box::new(PostgresConnector::new(
                    settings,
                    config.version_table.clone(),
                )),
            )
        };

    Ok(MigrationRunner::new(resolver, connector, options))
}
