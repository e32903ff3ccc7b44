use super::render::{OutputFormat, print_revision};
use super::{connect_migrator_with, migrations_dir};
use crate::config::Config;
use crate::procedure::ProcedureRegistry;
use anyhow::Result;
use console::style;
use std::path::Path;

pub async fn cmd_repair(
    config: &Config,
    root_dir: &Path,
    procedures: &ProcedureRegistry,
) -> Result<()> {
    let directory = migrations_dir(config, root_dir);

    let migrator = connect_migrator_with(config, procedures.clone()).await?;
    let result = migrator.repair(&directory).await;

    if let Ok(report) = &result {
        if report.repaired.is_empty() && report.unmatched.is_empty() {
            println!("Nothing to repair");
        }
        for record in &report.repaired {
            println!(
                "{} Repaired {} (version {})",
                style("✓").green(),
                record.script,
                record.version
            );
        }
        for script in &report.unmatched {
            println!(
                "{} No file for {}, left as failed",
                style("⚠").yellow(),
                script
            );
        }
    }

    let revision = migrator.revision().await;
    migrator.close().await;
    print_revision(&revision, OutputFormat::Human)?;

    result?;
    Ok(())
}
