use crate::helpers::harness::with_test_db;
use anyhow::Result;
use chrono::Utc;
use pgrev::config::types::TrackingTable;
use pgrev::migration::ScriptKind;
use pgrev::{Ledger, MigrationStatus, PgLedger, RevisionRecord, Version};

fn tracking_table(schema: &str) -> TrackingTable {
    TrackingTable {
        schema: schema.to_string(),
        name: "pgrev_revisions".to_string(),
    }
}

fn record(version: &str, script: &str, status: MigrationStatus) -> RevisionRecord {
    RevisionRecord {
        version: Version::parse(version).unwrap(),
        description: "add users".to_string(),
        kind: ScriptKind::Sql,
        script: script.to_string(),
        checksum: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
        installed_rank: 1,
        installed_by: "test-host".to_string(),
        installation_time: Utc::now(),
        execution_time: 12,
        status,
        reason: match status {
            MigrationStatus::Success => None,
            MigrationStatus::Failed => Some("syntax error".to_string()),
        },
    }
}

#[tokio::test]
async fn test_ensure_exists_creates_schema_and_table() -> Result<()> {
    with_test_db(async |db| {
        let ledger = PgLedger::new(db.pool().clone(), tracking_table("app"));

        ledger.ensure_exists().await?;
        ledger.ensure_exists().await?;

        assert!(db.table_exists("app", "pgrev_revisions").await);
        assert!(ledger.read_all().await?.is_empty());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_upsert_replaces_same_script_and_version() -> Result<()> {
    with_test_db(async |db| {
        let ledger = PgLedger::new(db.pool().clone(), tracking_table("public"));
        ledger.ensure_exists().await?;

        ledger
            .upsert(&record("1.1", "V1_1__users.sql", MigrationStatus::Failed))
            .await?;
        ledger
            .upsert(&record("1.1", "V1_1__users.sql", MigrationStatus::Success))
            .await?;
        ledger
            .upsert(&record("1.2", "V1_2__index.sql", MigrationStatus::Success))
            .await?;

        let rows = ledger.read_all().await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].script, "V1_1__users.sql");
        assert_eq!(rows[0].status, MigrationStatus::Success);
        assert_eq!(rows[0].reason, None);
        assert_eq!(rows[0].execution_time, 12);
        assert_eq!(rows[1].version.to_string(), "1.2");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_clear_and_drop() -> Result<()> {
    with_test_db(async |db| {
        let ledger = PgLedger::new(db.pool().clone(), tracking_table("public"));
        ledger.ensure_exists().await?;
        ledger
            .upsert(&record("1", "baseline", MigrationStatus::Success))
            .await?;

        ledger.clear().await?;
        assert!(ledger.read_all().await?.is_empty());

        ledger.drop_ledger().await?;
        assert!(!db.table_exists("public", "pgrev_revisions").await);
        assert!(ledger.read_all().await.is_err());

        // dropping again is a no-op
        ledger.drop_ledger().await?;
        Ok(())
    })
    .await
}
