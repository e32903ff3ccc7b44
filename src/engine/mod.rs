//! The migration engine.
//!
//! [`Migrator`] owns a [`Ledger`] and a [`Transport`] and keeps no state of its own
//! between calls: every operation starts from a fresh ledger scan.

mod step;


use crate::config::defaults::default_installed_by;
use crate::constants::{BASELINE_DESCRIPTION, BASELINE_SCRIPT};
use crate::db::Transport;
use crate::error::{MigrationError, Result};
use crate::migration::{
    DiscoveryFilter, MigrationDescriptor, ScriptKind, VersionGroup, discover_migrations,
};
use crate::migration_tracking::{Ledger, MigrationStatus, Revision, RevisionRecord};
use crate::procedure::ProcedureRegistry;
use crate::version::Version;
use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a `migrate` call did
#[derive(Debug, Clone, Serialize)]
pub struct MigrateReport {
    /// Current version before the run
    pub from: Version,
    /// Records written by this run, in execution order
    pub applied: Vec<RevisionRecord>,
}

impl MigrateReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// What a `repair` call did
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    pub repaired: Vec<RevisionRecord>,
    /// Failed scripts with no matching file in the migrations directory
    pub unmatched: Vec<String>,
}

pub struct Migrator<L, T> {
    ledger: L,
    transport: T,
    procedures: ProcedureRegistry,
    installed_by: String,
}

impl<L: Ledger, T: Transport> Migrator<L, T> {
    pub fn new(ledger: L, transport: T) -> Self {
        Self {
            ledger,
            transport,
            procedures: ProcedureRegistry::default(),
            installed_by: default_installed_by(),
        }
    }

    pub fn with_procedures(mut self, procedures: ProcedureRegistry) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn with_installed_by(mut self, installed_by: impl Into<String>) -> Self {
        self.installed_by = installed_by.into();
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reset the ledger to a single successful record at `version`.
    ///
    /// Earlier ledger history is discarded.
    pub async fn baseline(&self, version: &str, description: Option<&str>) -> Result<RevisionRecord> {
        let version = Version::parse(version)?;

        self.ledger
            .ensure_exists()
            .await
            .map_err(MigrationError::ledger)?;
        self.ledger.clear().await.map_err(MigrationError::ledger)?;

        let record = RevisionRecord {
            version,
            description: description.unwrap_or(BASELINE_DESCRIPTION).to_string(),
            kind: ScriptKind::Sql,
            script: BASELINE_SCRIPT.to_string(),
            checksum: None,
            installed_rank: 1,
            installed_by: self.installed_by.clone(),
            installation_time: Utc::now(),
            execution_time: 0,
            status: MigrationStatus::Success,
            reason: None,
        };
        self.ledger
            .upsert(&record)
            .await
            .map_err(MigrationError::ledger)?;

        info!("Baselined schema at version {}", record.version);
        Ok(record)
    }

    /// Current revision; an empty or unreadable ledger reads as unknown
    pub async fn revision(&self) -> Revision {
        match self.ledger.read_all().await {
            Ok(records) => Revision::from_records(records),
            Err(e) => {
                debug!("Revision ledger unreadable, reporting unknown: {:#}", e);
                Revision::unknown()
            }
        }
    }

    async fn load_revision(&self) -> Result<Revision> {
        self.ledger
            .ensure_exists()
            .await
            .map_err(MigrationError::ledger)?;
        let records = self
            .ledger
            .read_all()
            .await
            .map_err(MigrationError::ledger)?;
        Ok(Revision::from_records(records))
    }

    /// Apply every pending script in `directory`, one at a time in version order.
    ///
    /// With `target_version` only scripts at exactly that version run. The first
    /// failing step stops the run; steps already recorded stay recorded.
    pub async fn migrate(
        &self,
        directory: &Path,
        target_version: Option<&str>,
    ) -> Result<MigrateReport> {
        let target_version = target_version.map(Version::parse).transpose()?;

        let revision = self.load_revision().await?;
        let current = revision.version.clone().ok_or(MigrationError::NoBaseline)?;

        let filter = DiscoveryFilter {
            target_version,
            base_version: Some(current.clone()),
            exclude_at_base: revision
                .scripts_at_current_version()
                .map(str::to_string)
                .collect(),
        };
        let groups = discover_migrations(directory, &filter)?;

        let mut report = MigrateReport {
            from: current,
            applied: Vec::new(),
        };

        if groups.is_empty() {
            info!("Schema is up to date at version {}", report.from);
            return Ok(report);
        }

        let pending: usize = groups.iter().map(|g| g.migrations.len()).sum();
        info!(
            "Applying {} migration(s) across {} version(s) from {}",
            pending,
            groups.len(),
            report.from
        );

        for VersionGroup { version, migrations } in groups {
            debug!("Applying version {}", version);
            // Ranks continue after rows this group will not overwrite
            let recorded = revision
                .migrations
                .iter()
                .filter(|r| r.version == version)
                .filter(|r| !migrations.iter().any(|d| d.script == r.script))
                .count();
            for (position, mut descriptor) in migrations.into_iter().enumerate() {
                descriptor.rank = (recorded + position) as i32 + 1;
                let record = self.execute_step(&descriptor).await?;
                report.applied.push(record);
            }
        }

        Ok(report)
    }

    /// Re-run every failed script that still has a file in `directory`.
    ///
    /// Attempts are independent and run concurrently, each in its own transaction.
    /// Once all of them have settled the first failure, if any, is returned.
    pub async fn repair(&self, directory: &Path) -> Result<RepairReport> {
        self.ledger
            .ensure_exists()
            .await
            .map_err(MigrationError::ledger)?;
        let records = self
            .ledger
            .read_all()
            .await
            .map_err(MigrationError::ledger)?;

        let failed: Vec<RevisionRecord> = records.into_iter().filter(|r| !r.succeeded()).collect();
        if failed.is_empty() {
            info!("No failed migrations to repair");
            return Ok(RepairReport::default());
        }

        let mut available: HashMap<String, MigrationDescriptor> = HashMap::new();
        for group in discover_migrations(directory, &DiscoveryFilter::default())? {
            for descriptor in group.migrations {
                available.entry(descriptor.script.clone()).or_insert(descriptor);
            }
        }

        let mut report = RepairReport::default();
        let mut attempts = Vec::new();
        for record in &failed {
            match available.get(&record.script) {
                Some(descriptor) => {
                    let mut descriptor = descriptor.clone();
                    descriptor.rank = record.installed_rank;
                    attempts.push(descriptor);
                }
                None => {
                    warn!(
                        "No script found for failed migration {} (version {}), leaving it unresolved",
                        record.script, record.version
                    );
                    report.unmatched.push(record.script.clone());
                }
            }
        }

        let outcomes = join_all(attempts.iter().map(|d| self.execute_step(d))).await;

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.repaired.push(record),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Drop the ledger; a no-op when it does not exist
    pub async fn clean(&self) -> Result<()> {
        self.ledger
            .drop_ledger()
            .await
            .map_err(MigrationError::ledger)?;
        info!("Dropped revision ledger");
        Ok(())
    }

    pub async fn close(&self) {
        self.transport.shutdown().await;
    }
}
