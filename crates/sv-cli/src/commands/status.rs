//! Status command implementation

use anyhow::Result;

use crate::cli::StatusArgs;
use crate::commands::common::{build_runner, Project};

/// Execute the status command
pub async fn execute(args: &StatusArgs, project: &Project) -> Result<()> {
    let mut runner = build_runner(project, &args.target)?;
    let report = runner.plan().await?;

    println!("Endpoint: {}", report.endpoint);
    match report.persisted_version {
        Some(version) => println!("Current version: {}", version),
        None => println!(
            "Current version: none recorded (baseline {})",
            report.baseline
        ),
    }

    if report.pending.is_empty() {
        println!("Up to date");
        return Ok(());
    }

    println!();
    println!("Pending scripts:");
    for version in &report.pending {
        println!("  {}", version);
    }
    println!();
    println!("{} script(s) pending", report.pending.len());
    Ok(())
}
