pub mod discovery;
pub mod parsing;

pub use discovery::{DiscoveryFilter, VersionGroup, discover_migrations};
pub use parsing::{parse_migration_file, parse_migration_filename};

use crate::constants::{PROCEDURAL_EXTENSION, SQL_EXTENSION};
use crate::error::MigrationError;
use crate::version::Version;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How a migration script is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptKind {
    /// Plain SQL text executed as one script
    Sql,
    /// A compiled-in procedure registered under the script name
    Procedural,
}

impl ScriptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "SQL",
            Self::Procedural => "PROCEDURAL",
        }
    }

    /// Map a file extension (case-insensitive) to a script kind
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case(SQL_EXTENSION) {
            Some(Self::Sql)
        } else if extension.eq_ignore_ascii_case(PROCEDURAL_EXTENSION) {
            Some(Self::Procedural)
        } else {
            None
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SQL" => Ok(Self::Sql),
            "PROCEDURAL" => Ok(Self::Procedural),
            _ => Err(MigrationError::UnsupportedScriptKind(s.to_string())),
        }
    }
}

/// A migration file parsed from the migrations directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationDescriptor {
    /// File basename, the identity of the script in the revision ledger
    pub script: String,
    pub path: PathBuf,
    pub kind: ScriptKind,
    pub version: Version,
    pub description: String,
    /// 1-based rank among the ledger rows at this version, assigned right before execution
    pub rank: i32,
}
