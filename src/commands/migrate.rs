use super::render::{OutputFormat, print_revision};
use super::{connect_migrator_with, migrations_dir};
use crate::config::Config;
use crate::migration::{DiscoveryFilter, ScriptKind, discover_migrations};
use crate::procedure::ProcedureRegistry;
use crate::version::Version;
use anyhow::Result;
use console::style;
use std::path::Path;
use tracing::{info, warn};

/// Apply pending migrations.
///
/// `.rs` scripts run the procedure registered under their file name in `procedures`.
/// The stock `pgrev` binary registers none, so those steps are recorded as failed.
pub async fn cmd_migrate(
    config: &Config,
    root_dir: &Path,
    target_version: Option<&str>,
    procedures: &ProcedureRegistry,
) -> Result<()> {
    if let Some(target) = target_version {
        Version::parse(target)?;
    }

    let directory = migrations_dir(config, root_dir);
    info!("Applying migrations from {}", directory.display());

    for script in unregistered_procedures(&directory, procedures) {
        warn!(
            "{} has no registered procedure in this binary and will be recorded as failed",
            script
        );
    }

    let migrator = connect_migrator_with(config, procedures.clone()).await?;
    let result = migrator.migrate(&directory, target_version).await;

    match &result {
        Ok(report) if report.is_noop() => {
            println!("Schema is up to date at version {}", report.from);
        }
        Ok(report) => {
            println!(
                "{} Applied {} migration(s) starting from version {}",
                style("✓").green(),
                report.applied.len(),
                report.from
            );
        }
        Err(_) => {}
    }

    // The table shows what was recorded, including a failure that stopped the run
    let revision = migrator.revision().await;
    migrator.close().await;
    print_revision(&revision, OutputFormat::Human)?;

    result?;
    Ok(())
}

/// Procedural scripts in `directory` with no procedure registered for them
fn unregistered_procedures(directory: &Path, procedures: &ProcedureRegistry) -> Vec<String> {
    // Directory errors surface from `migrate` itself
    discover_migrations(directory, &DiscoveryFilter::default())
        .unwrap_or_default()
        .into_iter()
        .flat_map(|group| group.migrations)
        .filter(|m| m.kind == ScriptKind::Procedural && procedures.get(&m.script).is_none())
        .map(|m| m.script)
        .collect()
}
