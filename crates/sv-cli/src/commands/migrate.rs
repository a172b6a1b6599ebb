//! Migrate command implementation

use anyhow::Result;

use crate::cli::MigrateArgs;
use crate::commands::common::{build_runner, Project};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, project: &Project) -> Result<()> {
    let mut runner = build_runner(project, &args.target)?;
    let report = runner.run().await?;

    for applied in &report.applied {
        log::debug!(
            "Applied {} in {:.2}s",
            applied.file,
            applied.elapsed.as_secs_f64()
        );
    }
    Ok(())
}
