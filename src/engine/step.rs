use super::Migrator;
use crate::db::Transport;
use crate::error::{MigrationError, Result};
use crate::migration::{MigrationDescriptor, ScriptKind};
use crate::migration_tracking::{Ledger, MigrationStatus, RevisionRecord, calculate_checksum};
use crate::procedure::{Procedure, ProcedureRegistry};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A loaded script, ready to run inside one transaction
enum MigrationScript {
    Sql(String),
    Procedural(Arc<dyn Procedure>),
}

impl MigrationScript {
    /// Load the script body; returns it with the checksum of the file contents
    async fn load(
        descriptor: &MigrationDescriptor,
        procedures: &ProcedureRegistry,
    ) -> anyhow::Result<(Self, String)> {
        let contents = tokio::fs::read(&descriptor.path)
            .await
            .with_context(|| format!("Failed to read {}", descriptor.path.display()))?;
        let checksum = calculate_checksum(&contents);

        let script = match descriptor.kind {
            ScriptKind::Sql => {
                let sql = String::from_utf8(contents).with_context(|| {
                    format!("{} is not valid UTF-8", descriptor.path.display())
                })?;
                Self::Sql(sql)
            }
            ScriptKind::Procedural => {
                let procedure = procedures.get(&descriptor.script).ok_or_else(|| {
                    anyhow::anyhow!(
                        "No procedure registered for '{}'; register it in the ProcedureRegistry",
                        descriptor.script
                    )
                })?;
                Self::Procedural(procedure)
            }
        };

        Ok((script, checksum))
    }

    async fn apply_in_transaction<T: Transport>(&self, transport: &T) -> anyhow::Result<()> {
        match self {
            Self::Sql(sql) => transport.execute_script_in_transaction(sql).await,
            Self::Procedural(procedure) => {
                transport
                    .execute_procedure_in_transaction(procedure.as_ref())
                    .await
            }
        }
    }
}

impl<L: Ledger, T: Transport> Migrator<L, T> {
    /// Run one script in its own transaction and record the attempt.
    ///
    /// The ledger row is written whatever the outcome; a failed script is reported
    /// only after its failure has been recorded.
    pub(super) async fn execute_step(
        &self,
        descriptor: &MigrationDescriptor,
    ) -> Result<RevisionRecord> {
        if descriptor.path.as_os_str().is_empty() {
            return Err(MigrationError::MalformedDescriptor {
                script: descriptor.script.clone(),
                reason: "missing script path".to_string(),
            });
        }

        let installation_time = Utc::now();
        let started = Instant::now();

        let (outcome, checksum) = match MigrationScript::load(descriptor, &self.procedures).await {
            Ok((script, checksum)) => (
                script.apply_in_transaction(&self.transport).await,
                Some(checksum),
            ),
            Err(e) => (Err(e), None),
        };

        let reason = outcome.as_ref().err().map(|e| format!("{:#}", e));
        let record = RevisionRecord {
            version: descriptor.version.clone(),
            description: descriptor.description.clone(),
            kind: descriptor.kind,
            script: descriptor.script.clone(),
            checksum,
            installed_rank: descriptor.rank,
            installed_by: self.installed_by.clone(),
            installation_time,
            execution_time: started.elapsed().as_millis() as i64,
            status: if reason.is_none() {
                MigrationStatus::Success
            } else {
                MigrationStatus::Failed
            },
            reason,
        };

        self.ledger
            .upsert(&record)
            .await
            .map_err(MigrationError::ledger)?;

        match &record.reason {
            None => {
                info!(
                    "Applied {} (version {}, rank {}) in {} ms",
                    record.script, record.version, record.installed_rank, record.execution_time
                );
                Ok(record)
            }
            Some(reason) => {
                warn!(
                    "Migration {} (version {}) failed: {}",
                    record.script, record.version, reason
                );
                Err(MigrationError::MigrationStepFailed {
                    version: record.version.to_string(),
                    script: record.script.clone(),
                    reason: reason.clone(),
                })
            }
        }
    }
}
