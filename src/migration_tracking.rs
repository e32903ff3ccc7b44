pub mod pg_ledger;

use crate::config::types::TrackingTable;
use crate::constants::UNKNOWN_VERSION;
use crate::migration::ScriptKind;
use crate::version::Version;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

pub use pg_ledger::PgLedger;

/// Outcome of one migration attempt, stored as 0 (success) or non-zero (failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Success,
    Failed,
}

impl MigrationStatus {
    pub fn code(&self) -> i16 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
        }
    }

    pub fn from_code(code: i16) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failed
        }
    }
}

/// One row of the revision ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionRecord {
    pub version: Version,
    pub description: String,
    pub kind: ScriptKind,
    pub script: String,
    pub checksum: Option<String>,
    pub installed_rank: i32,
    pub installed_by: String,
    pub installation_time: DateTime<Utc>,
    /// Milliseconds spent inside the step's transaction
    pub execution_time: i64,
    pub status: MigrationStatus,
    pub reason: Option<String>,
}

impl RevisionRecord {
    pub fn succeeded(&self) -> bool {
        self.status == MigrationStatus::Success
    }
}

/// Persisted store of migration attempts for one schema.
///
/// Implementations must key rows by `(script, version)` so that `upsert` replaces a
/// previous attempt of the same script instead of adding a second row.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create the ledger if missing; never touches existing rows
    async fn ensure_exists(&self) -> Result<()>;

    /// Delete every row but keep the ledger
    async fn clear(&self) -> Result<()>;

    /// Remove the ledger entirely; a missing ledger is not an error
    async fn drop_ledger(&self) -> Result<()>;

    async fn read_all(&self) -> Result<Vec<RevisionRecord>>;

    /// Insert the record, or overwrite the row with the same script and version
    async fn upsert(&self, record: &RevisionRecord) -> Result<()>;
}

/// The schema's current state, derived from a full ledger scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    #[serde(serialize_with = "serialize_current_version")]
    pub version: Option<Version>,
    pub migrations: Vec<RevisionRecord>,
}

fn serialize_current_version<S: Serializer>(
    version: &Option<Version>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match version {
        Some(version) => serializer.collect_str(version),
        None => serializer.serialize_str(UNKNOWN_VERSION),
    }
}

impl Revision {
    pub fn unknown() -> Self {
        Self {
            version: None,
            migrations: Vec::new(),
        }
    }

    /// Derive the current revision from ledger rows.
    ///
    /// The current version is the highest version with at least one successful
    /// record; all of its records are reported. Failures at versions that never
    /// succeeded are appended so unresolved attempts stay visible.
    pub fn from_records(records: Vec<RevisionRecord>) -> Self {
        let mut by_version: BTreeMap<Version, Vec<RevisionRecord>> = BTreeMap::new();
        for record in records {
            by_version
                .entry(record.version.clone())
                .or_default()
                .push(record);
        }

        let current = by_version
            .iter()
            .rev()
            .find(|(_, records)| records.iter().any(RevisionRecord::succeeded))
            .map(|(version, _)| version.clone());

        let mut migrations = current
            .as_ref()
            .and_then(|version| by_version.remove(version))
            .unwrap_or_default();

        for records in by_version.into_values() {
            if !records.iter().any(RevisionRecord::succeeded) {
                migrations.extend(records);
            }
        }

        Self {
            version: current,
            migrations,
        }
    }

    /// Current version as shown to users, "Unknown" before any baseline
    pub fn version_label(&self) -> String {
        self.version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// Scripts recorded at the current version
    pub fn scripts_at_current_version(&self) -> impl Iterator<Item = &str> {
        self.migrations
            .iter()
            .filter(|record| Some(&record.version) == self.version.as_ref())
            .map(|record| record.script.as_str())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RevisionRecord> {
        self.migrations.iter().filter(|record| !record.succeeded())
    }
}

/// Validate and quote a schema-qualified ledger table name for SQL queries
pub fn format_tracking_table_name(tracking_table: &TrackingTable) -> Result<String> {
    Ok(format!(
        "{}.{}",
        quote_identifier(&tracking_table.schema)?,
        quote_identifier(&tracking_table.name)?
    ))
}

/// Quote a SQL identifier after checking it only uses PostgreSQL identifier characters
pub fn quote_identifier(name: &str) -> Result<String> {
    fn is_valid_sql_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    if !is_valid_sql_identifier(name) {
        return Err(anyhow::anyhow!(
            "Invalid identifier '{}': must contain only letters, numbers, underscores, and dollar signs, starting with letter or underscore",
            name
        ));
    }

    Ok(format!(r#""{}""#, name))
}

/// Calculate checksum for migration content
pub fn calculate_checksum(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}
