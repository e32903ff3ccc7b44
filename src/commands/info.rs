use super::connect_migrator;
use super::render::{OutputFormat, print_revision};
use crate::config::Config;
use anyhow::Result;

pub async fn cmd_info(config: &Config, format: OutputFormat) -> Result<()> {
    let migrator = connect_migrator(config).await?;
    let revision = migrator.revision().await;
    migrator.close().await;

    print_revision(&revision, format)
}
