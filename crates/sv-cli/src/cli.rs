//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sv_core::Environment;

/// schemaver - apply versioned DDL scripts to an environment's database
#[derive(Parser, Debug)]
#[command(name = "schemaver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Also write log lines to this file
    #[arg(long, global = true, env = "SCHEMAVER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending DDL scripts
    Migrate(MigrateArgs),

    /// Show the current version and the scripts a migrate would apply
    Status(StatusArgs),

    /// List the DDL scripts in the scripts directory
    Ls(LsArgs),
}

/// Which database to target
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Target environment (dev, qa or prod)
    #[arg(short, long)]
    pub environment: Option<Environment>,

    /// Cloud region of the database cluster
    #[arg(short, long)]
    pub region: Option<String>,

    /// Connect to host[:port] instead of looking the cluster up
    #[arg(long, conflicts_with = "duckdb")]
    pub endpoint: Option<String>,

    /// Migrate a local DuckDB file instead of the cluster
    #[arg(long)]
    pub duckdb: Option<PathBuf>,

    /// Override the scripts directory
    #[arg(short, long)]
    pub scripts_dir: Option<PathBuf>,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Override the scripts directory
    #[arg(short, long)]
    pub scripts_dir: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
