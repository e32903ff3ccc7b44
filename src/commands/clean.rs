use super::connect_migrator;
use crate::config::Config;
use crate::migration_tracking::format_tracking_table_name;
use anyhow::{Result, bail};
use console::style;
use dialoguer::Confirm;
use std::io::IsTerminal;

/// How `clean` decides whether it may drop the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Forced,
    Prompt,
    Refuse,
}

impl Confirmation {
    pub fn detect(force: bool, interactive: bool) -> Self {
        if force {
            Self::Forced
        } else if interactive {
            Self::Prompt
        } else {
            Self::Refuse
        }
    }
}

pub async fn cmd_clean(config: &Config, force: bool) -> Result<()> {
    let table = format_tracking_table_name(&config.migration.tracking_table)?;

    match Confirmation::detect(force, std::io::stdin().is_terminal()) {
        Confirmation::Forced => {}
        Confirmation::Prompt => {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Drop revision ledger {}? All migration history will be lost",
                    table
                ))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("Aborted");
                return Ok(());
            }
        }
        Confirmation::Refuse => {
            bail!(
                "Refusing to drop revision ledger {} without confirmation.\n\n\
                 Re-run with --force in non-interactive environments.",
                table
            );
        }
    }

    let migrator = connect_migrator(config).await?;
    let result = migrator.clean().await;
    migrator.close().await;
    result?;

    println!("{} Dropped revision ledger {}", style("✓").green(), table);
    Ok(())
}
