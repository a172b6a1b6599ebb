//! Ls command implementation

use anyhow::Result;
use sv_core::{load_scripts, short_checksum};

use crate::cli::LsArgs;
use crate::commands::common::Project;

/// Execute the ls command
pub async fn execute(args: &LsArgs, project: &Project) -> Result<()> {
    let dir = project.scripts_dir(args.scripts_dir.as_deref());
    let pattern = project.config.script_pattern()?;
    let scripts = load_scripts(&dir, &pattern)?;

    if scripts.is_empty() {
        println!(
            "No scripts in {} matching {}",
            dir.display(),
            pattern.display()
        );
        return Ok(());
    }

    let name_width = scripts
        .iter()
        .map(|s| s.entry.file_name().len())
        .max()
        .unwrap_or(0);

    println!(
        "{:<8}  {:<width$}  {:<12}  DECLARED",
        "VERSION",
        "FILE",
        "SHA256",
        width = name_width
    );
    for script in &scripts {
        let declared = match (script.declared_version, script.version_mismatch()) {
            (_, Some(declared)) => format!("{} (mismatch)", declared),
            (Some(declared), None) => declared.to_string(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<8}  {:<width$}  {:<12}  {}",
            script.version().to_string(),
            script.entry.file_name(),
            short_checksum(&script.checksum),
            declared,
            width = name_width
        );
    }
    println!();
    println!("{} scripts found", scripts.len());
    Ok(())
}
