use crate::config::types::*;
use crate::constants::{
    DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CONNECT_RETRIES, DEFAULT_LEDGER_SCHEMA, DEFAULT_LEDGER_TABLE,
    DEFAULT_MIGRATIONS_DIR, DEFAULT_RETRY_DELAY, UNKNOWN_HOST,
};

impl Default for Directories {
    fn default() -> Self {
        Self {
            migrations: DEFAULT_MIGRATIONS_DIR.to_string(),
        }
    }
}

impl Default for Migration {
    fn default() -> Self {
        Self {
            tracking_table: TrackingTable::default(),
            installed_by: default_installed_by(),
        }
    }
}

impl Default for TrackingTable {
    fn default() -> Self {
        Self {
            schema: DEFAULT_LEDGER_SCHEMA.to_string(),
            name: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_CONNECT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Host identifier recorded as `installed_by`: $HOSTNAME, then /etc/hostname
pub fn default_installed_by() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
