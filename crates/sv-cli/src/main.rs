//! schemaver - apply versioned DDL scripts to an environment's database

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::Cli;
use commands::common::{load_project, Project};
use commands::{ls, migrate, status};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The log file may come from the config, so load it before the logger.
    let project = load_project(&cli.global);
    let log_file = cli.global.log_file.clone().or_else(|| {
        project
            .as_ref()
            .ok()
            .and_then(|p| p.config.log_file.as_ref().map(|f| p.root.join(f)))
    });

    if let Err(e) = logging::init(cli.global.verbose, log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    let result = match project {
        Ok(project) => dispatch(&cli, &project).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli, project: &Project) -> Result<()> {
    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, project).await,
        cli::Commands::Status(args) => status::execute(args, project).await,
        cli::Commands::Ls(args) => ls::execute(args, project).await,
    }
}
