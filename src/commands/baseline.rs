use super::connect_migrator;
use crate::config::Config;
use crate::version::Version;
use anyhow::Result;
use console::style;

pub async fn cmd_baseline(config: &Config, version: &str, description: Option<&str>) -> Result<()> {
    // Reject a bad version before touching the database
    Version::parse(version)?;

    let migrator = connect_migrator(config).await?;
    let result = migrator.baseline(version, description).await;
    migrator.close().await;
    let record = result?;

    println!(
        "{} Baselined at version {} ({})",
        style("✓").green(),
        style(&record.version).bold(),
        record.description
    );
    Ok(())
}
