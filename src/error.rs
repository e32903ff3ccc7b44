use std::path::PathBuf;

/// Errors surfaced by the migration engine and its building blocks.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid version '{0}': expected dot-separated numeric groups such as 1, 1.2 or v1_2")]
    InvalidVersion(String),

    #[error("Unrecognized migration filename '{0}': expected <version>__<description>.sql or .rs")]
    InvalidFilename(String),

    #[error("Migrations path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Migrations directory not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Insufficient access to migrations directory {}", .path.display())]
    InsufficientAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "No baseline found in the revision ledger.\n\n\
         Run 'pgrev baseline <version>' to declare the version the schema is currently at."
    )]
    NoBaseline,

    #[error(
        "Migration {version} ({script}) failed: {reason}\n\n\
         The failure was recorded in the revision ledger; inspect it with 'pgrev info'.\n\
         Fix the script and run 'pgrev repair' to retry it."
    )]
    MigrationStepFailed {
        version: String,
        script: String,
        reason: String,
    },

    #[error("Unsupported script kind '{0}'")]
    UnsupportedScriptKind(String),

    #[error("Malformed migration descriptor for '{script}': {reason}")]
    MalformedDescriptor { script: String, reason: String },

    #[error("Revision ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl MigrationError {
    /// Wrap a ledger store failure, keeping the full cause chain in the message
    pub fn ledger(error: anyhow::Error) -> Self {
        Self::LedgerUnavailable(format!("{:#}", error))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
