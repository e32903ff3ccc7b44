use std::time::Duration;

// Migration file naming conventions
pub const DESCRIPTION_SEPARATOR: &str = "__";
pub const SQL_EXTENSION: &str = "sql";
pub const PROCEDURAL_EXTENSION: &str = "rs";

// Revision ledger
pub const BASELINE_SCRIPT: &str = "baseline";
pub const BASELINE_DESCRIPTION: &str = "Baseline";
pub const DEFAULT_LEDGER_SCHEMA: &str = "public";
pub const DEFAULT_LEDGER_TABLE: &str = "pgrev_revisions";
pub const UNKNOWN_VERSION: &str = "Unknown";

// Configuration
pub const CONFIG_FILENAME: &str = "pgrev.yaml";
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";
pub const UNKNOWN_HOST: &str = "unknown";

// Connection handling
pub const DEFAULT_CONNECT_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
