use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

/// Merge two optional sections field by field when both are present
fn merge_section<T>(a: Option<T>, b: Option<T>, merge_with: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(merge_with(a, b)),
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            databases: merge_section(self.databases, other.databases, DatabasesInput::merge_with),
            directories: merge_section(
                self.directories,
                other.directories,
                DirectoriesInput::merge_with,
            ),
            migration: merge_section(self.migration, other.migration, MigrationInput::merge_with),
            connection: merge_section(
                self.connection,
                other.connection,
                ConnectionInput::merge_with,
            ),
        }
    }
}

impl DatabasesInput {
    pub fn merge_with(self, other: DatabasesInput) -> DatabasesInput {
        DatabasesInput {
            target_url: other.target_url.or(self.target_url),
        }
    }
}

impl DirectoriesInput {
    pub fn merge_with(self, other: DirectoriesInput) -> DirectoriesInput {
        DirectoriesInput {
            migrations_dir: other.migrations_dir.or(self.migrations_dir),
        }
    }
}

impl MigrationInput {
    pub fn merge_with(self, other: MigrationInput) -> MigrationInput {
        MigrationInput {
            tracking_table: merge_section(
                self.tracking_table,
                other.tracking_table,
                TrackingTableInput::merge_with,
            ),
            installed_by: other.installed_by.or(self.installed_by),
        }
    }
}

impl TrackingTableInput {
    pub fn merge_with(self, other: TrackingTableInput) -> TrackingTableInput {
        TrackingTableInput {
            schema: other.schema.or(self.schema),
            name: other.name.or(self.name),
        }
    }
}

impl ConnectionInput {
    pub fn merge_with(self, other: ConnectionInput) -> ConnectionInput {
        ConnectionInput {
            max_retries: other.max_retries.or(self.max_retries),
            retry_delay_ms: other.retry_delay_ms.or(self.retry_delay_ms),
            acquire_timeout_secs: other.acquire_timeout_secs.or(self.acquire_timeout_secs),
        }
    }
}
