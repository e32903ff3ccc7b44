use super::{
    Ledger, MigrationStatus, RevisionRecord, format_tracking_table_name, quote_identifier,
};
use crate::config::types::TrackingTable;
use crate::migration::ScriptKind;
use crate::version::Version;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

/// Revision ledger stored in a PostgreSQL table inside the managed schema
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
    tracking_table: TrackingTable,
}

impl PgLedger {
    pub fn new(pool: PgPool, tracking_table: TrackingTable) -> Self {
        Self {
            pool,
            tracking_table,
        }
    }

    fn table_name(&self) -> Result<String> {
        format_tracking_table_name(&self.tracking_table)
    }
}

fn record_from_row(row: &PgRow) -> Result<RevisionRecord> {
    let raw_version: String = row.try_get("version")?;
    let version = Version::parse(&raw_version)
        .with_context(|| format!("Corrupted version '{}' in revision ledger", raw_version))?;
    let raw_kind: String = row.try_get("kind")?;
    let kind: ScriptKind = raw_kind.parse()?;
    let status: i16 = row.try_get("status")?;
    let installation_time: DateTime<Utc> = row.try_get("installation_time")?;

    Ok(RevisionRecord {
        version,
        description: row.try_get("description")?,
        kind,
        script: row.try_get("script")?,
        checksum: row.try_get("checksum")?,
        installed_rank: row.try_get("installed_rank")?,
        installed_by: row.try_get("installed_by")?,
        installation_time,
        execution_time: row.try_get("execution_time")?,
        status: MigrationStatus::from_code(status),
        reason: row.try_get("reason")?,
    })
}

#[async_trait]
impl Ledger for PgLedger {
    async fn ensure_exists(&self) -> Result<()> {
        let table_name = self.table_name()?;
        let schema = quote_identifier(&self.tracking_table.schema)?;

        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create schema {}", schema))?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id SERIAL PRIMARY KEY,
                version TEXT NOT NULL,
                description TEXT NOT NULL,
                kind TEXT NOT NULL,
                script TEXT NOT NULL,
                checksum TEXT,
                installed_rank INT NOT NULL,
                installed_by TEXT NOT NULL,
                installation_time TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
                execution_time BIGINT NOT NULL,
                status SMALLINT NOT NULL,
                reason TEXT,
                UNIQUE (script, version)
            )
            "#,
            table_name
        ))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to create revision ledger {}", table_name))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let table_name = self.table_name()?;

        let result = sqlx::query(&format!("DELETE FROM {}", table_name))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to clear revision ledger {}", table_name))?;

        debug!(
            "Cleared {} rows from revision ledger {}",
            result.rows_affected(),
            table_name
        );
        Ok(())
    }

    async fn drop_ledger(&self) -> Result<()> {
        let table_name = self.table_name()?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_name))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to drop revision ledger {}", table_name))?;

        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<RevisionRecord>> {
        let table_name = self.table_name()?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT version, description, kind, script, checksum, installed_rank,
                   installed_by, installation_time, execution_time, status, reason
            FROM {}
            ORDER BY id
            "#,
            table_name
        ))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to read revision ledger {}", table_name))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn upsert(&self, record: &RevisionRecord) -> Result<()> {
        let table_name = self.table_name()?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (
                version, description, kind, script, checksum, installed_rank,
                installed_by, installation_time, execution_time, status, reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (script, version) DO UPDATE SET
                description = EXCLUDED.description,
                kind = EXCLUDED.kind,
                checksum = EXCLUDED.checksum,
                installed_rank = EXCLUDED.installed_rank,
                installed_by = EXCLUDED.installed_by,
                installation_time = EXCLUDED.installation_time,
                execution_time = EXCLUDED.execution_time,
                status = EXCLUDED.status,
                reason = EXCLUDED.reason
            "#,
            table_name
        ))
        .bind(record.version.to_string())
        .bind(&record.description)
        .bind(record.kind.as_str())
        .bind(&record.script)
        .bind(&record.checksum)
        .bind(record.installed_rank)
        .bind(&record.installed_by)
        .bind(record.installation_time)
        .bind(record.execution_time)
        .bind(record.status.code())
        .bind(&record.reason)
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to record {} (version {}) in revision ledger {}",
                record.script, record.version, table_name
            )
        })?;

        Ok(())
    }
}
