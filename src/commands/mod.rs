pub mod baseline;
pub mod clean;
pub mod info;
pub mod migrate;
pub mod render;
pub mod repair;

// Re-export all command functions
pub use baseline::cmd_baseline;
pub use clean::cmd_clean;
pub use info::cmd_info;
pub use migrate::cmd_migrate;
pub use render::OutputFormat;
pub use repair::cmd_repair;

use crate::config::Config;
use crate::db::{PgTransport, connect_with_retry, mask_url_password};
use crate::engine::Migrator;
use crate::migration_tracking::PgLedger;
use crate::procedure::ProcedureRegistry;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::debug;

pub type PgMigrator = Migrator<PgLedger, PgTransport>;

/// Connect to the target database and build a migrator scoped to the ledger schema
pub async fn connect_migrator(config: &Config) -> Result<PgMigrator> {
    connect_migrator_with(config, ProcedureRegistry::default()).await
}

/// Like [`connect_migrator`], for binaries that compile in procedural migrations
pub async fn connect_migrator_with(
    config: &Config,
    procedures: ProcedureRegistry,
) -> Result<PgMigrator> {
    let url = config.databases.target.as_deref().ok_or_else(|| {
        anyhow!(
            "No target database configured.\n\n\
             Pass --target-url, set databases.target_url in the config file, \
             or export TARGET_DATABASE_URL."
        )
    })?;

    debug!("Connecting to {}", mask_url_password(url));
    let pool = connect_with_retry(url, &config.connection).await?;

    let tracking_table = config.migration.tracking_table.clone();
    let transport = PgTransport::new(pool.clone(), tracking_table.schema.clone());
    let ledger = PgLedger::new(pool, tracking_table);

    Ok(Migrator::new(ledger, transport)
        .with_procedures(procedures)
        .with_installed_by(config.migration.installed_by.clone()))
}

/// Migrations directory from config, relative paths taken from the config file's directory
pub fn migrations_dir(config: &Config, root_dir: &Path) -> PathBuf {
    root_dir.join(&config.directories.migrations)
}
