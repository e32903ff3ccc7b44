use crate::config::{merge::Merge, types::*};
use anyhow::{Result, anyhow};
use std::time::Duration;

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            databases: self.resolve_databases(&defaults.databases),
            directories: self.resolve_directories(&defaults.directories),
            migration: self.resolve_migration(&defaults.migration)?,
            connection: self.resolve_connection(&defaults.connection),
        })
    }

    fn resolve_databases(&self, defaults: &Databases) -> Databases {
        let target = self
            .config_input
            .databases
            .as_ref()
            .and_then(|d| d.target_url.as_ref())
            .cloned()
            .or_else(|| std::env::var("TARGET_DATABASE_URL").ok())
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .or_else(|| defaults.target.clone());

        Databases { target }
    }

    fn resolve_directories(&self, defaults: &Directories) -> Directories {
        Directories {
            migrations: self
                .config_input
                .directories
                .as_ref()
                .and_then(|d| d.migrations_dir.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.migrations.clone()),
        }
    }

    fn resolve_migration(&self, defaults: &Migration) -> Result<Migration> {
        let mig_input = self.config_input.migration.as_ref();

        let tracking_table = mig_input
            .and_then(|m| m.tracking_table.as_ref())
            .map(|t| TrackingTable {
                schema: t
                    .schema
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.tracking_table.schema.clone()),
                name: t
                    .name
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.tracking_table.name.clone()),
            })
            .unwrap_or_else(|| defaults.tracking_table.clone());

        if tracking_table.schema.trim().is_empty() || tracking_table.name.trim().is_empty() {
            return Err(anyhow!(
                "migration.tracking_table requires a non-empty schema and name"
            ));
        }

        Ok(Migration {
            tracking_table,
            installed_by: mig_input
                .and_then(|m| m.installed_by.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.installed_by.clone()),
        })
    }

    fn resolve_connection(&self, defaults: &Connection) -> Connection {
        let conn_input = self.config_input.connection.as_ref();

        Connection {
            max_retries: conn_input
                .and_then(|c| c.max_retries)
                .unwrap_or(defaults.max_retries),
            retry_delay: conn_input
                .and_then(|c| c.retry_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            acquire_timeout: conn_input
                .and_then(|c| c.acquire_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
