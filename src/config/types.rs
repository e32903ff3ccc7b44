use clap::Args;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigInput {
    pub databases: Option<DatabasesInput>,
    pub directories: Option<DirectoriesInput>,
    pub migration: Option<MigrationInput>,
    pub connection: Option<ConnectionInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub databases: Databases,
    pub directories: Directories,
    pub migration: Migration,
    pub connection: Connection,
}

// Database configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabasesInput {
    pub target_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Databases {
    pub target: Option<String>,
}

// Directory configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoriesInput {
    pub migrations_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Directories {
    pub migrations: String,
}

// Migration configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationInput {
    pub tracking_table: Option<TrackingTableInput>,
    pub installed_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingTableInput {
    pub schema: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub tracking_table: TrackingTable,
    pub installed_by: String,
}

/// Location of the revision ledger; its schema is also where migrations run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingTable {
    pub schema: String,
    pub name: String,
}

// Connection configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionInput {
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub acquire_timeout: Duration,
}

// CLI argument groups for command-specific options
#[derive(Debug, Clone, Default, Args)]
pub struct DatabaseArgs {
    #[arg(long, help = "Target database URL")]
    pub target_url: Option<String>,

    #[arg(long, help = "Schema holding the revision ledger and receiving migrations")]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DirectoryArgs {
    #[arg(long, help = "Migrations directory path")]
    pub migrations_dir: Option<String>,
}

// Conversion functions from CLI args to config input
impl From<DatabaseArgs> for ConfigInput {
    fn from(args: DatabaseArgs) -> Self {
        Self {
            databases: Some(DatabasesInput {
                target_url: args.target_url,
            }),
            migration: args.schema.map(|schema| MigrationInput {
                tracking_table: Some(TrackingTableInput {
                    schema: Some(schema),
                    name: None,
                }),
                installed_by: None,
            }),
            ..Self::default()
        }
    }
}

impl From<DirectoryArgs> for DirectoriesInput {
    fn from(args: DirectoryArgs) -> Self {
        Self {
            migrations_dir: args.migrations_dir,
        }
    }
}
