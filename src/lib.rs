//! Versioned PostgreSQL migrations with a revision ledger.
//!
//! Scripts live in one directory as `<version>__<description>.sql` (or `.rs` for
//! procedures compiled into the binary). [`Migrator`] applies the ones above the
//! schema's current version, each in its own transaction, and records every attempt
//! in the ledger table so failures can be inspected and repaired later.

pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod error;
pub mod migration;
pub mod migration_tracking;
pub mod procedure;
pub mod version;

pub use engine::{MigrateReport, Migrator, RepairReport};
pub use error::{MigrationError, Result};
pub use migration_tracking::{Ledger, MigrationStatus, PgLedger, Revision, RevisionRecord};
pub use procedure::{Procedure, ProcedureRegistry};
pub use version::Version;
