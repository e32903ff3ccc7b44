use crate::helpers::harness::{TestDatabase, with_test_db};
use anyhow::Result;
use async_trait::async_trait;
use pgrev::config::types::TrackingTable;
use pgrev::db::{PgTransport, TransactionHandle};
use pgrev::{
    MigrationError, MigrationStatus, Migrator, PgLedger, Procedure, ProcedureRegistry,
};
use std::fs;
use tempfile::TempDir;

fn migrator(db: &TestDatabase, schema: &str) -> Migrator<PgLedger, PgTransport> {
    let tracking_table = TrackingTable {
        schema: schema.to_string(),
        name: "pgrev_revisions".to_string(),
    };
    Migrator::new(
        PgLedger::new(db.pool().clone(), tracking_table),
        PgTransport::new(db.pool().clone(), schema),
    )
    .with_installed_by("integration-test")
}

fn write(dir: &TempDir, name: &str, sql: &str) {
    fs::write(dir.path().join(name), sql).unwrap();
}

#[tokio::test]
async fn test_migrate_fail_repair_cycle() -> Result<()> {
    with_test_db(async |db| {
        let migrations = TempDir::new()?;
        write(&migrations, "V1_1__users.sql", "CREATE TABLE users (id INT PRIMARY KEY);");
        write(
            &migrations,
            "V1_2__emails.sql",
            "ALTER TABLE users ADD COLUMN email TEXT;\nALTER TABLE missing ADD COLUMN x INT;",
        );

        let migrator = migrator(db, "public");
        migrator.baseline("1.0", None).await?;

        let error = migrator.migrate(migrations.path(), None).await.unwrap_err();
        assert!(matches!(error, MigrationError::MigrationStepFailed { .. }));

        // The failed script was rolled back as a whole
        let email_columns: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.columns \
             WHERE table_name = 'users' AND column_name = 'email'",
        )
        .fetch_one(db.pool())
        .await?;
        assert_eq!(email_columns, 0);

        let revision = migrator.revision().await;
        assert_eq!(revision.version_label(), "1.1");
        let failure = revision.failures().next().unwrap();
        assert_eq!(failure.script, "V1_2__emails.sql");
        assert!(failure.reason.as_deref().unwrap().contains("missing"));

        write(
            &migrations,
            "V1_2__emails.sql",
            "ALTER TABLE users ADD COLUMN email TEXT;",
        );
        let report = migrator.repair(migrations.path()).await?;
        assert_eq!(report.repaired.len(), 1);
        assert_eq!(report.repaired[0].status, MigrationStatus::Success);

        let revision = migrator.revision().await;
        assert_eq!(revision.version_label(), "1.2");
        assert_eq!(revision.failures().count(), 0);

        // Nothing left to apply
        assert!(migrator.migrate(migrations.path(), None).await?.is_noop());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_scripts_run_in_the_ledger_schema() -> Result<()> {
    with_test_db(async |db| {
        let migrations = TempDir::new()?;
        write(&migrations, "V2__items.sql", "CREATE TABLE items (id INT);");

        let migrator = migrator(db, "tenant_a");
        migrator.baseline("1", None).await?;
        migrator.migrate(migrations.path(), None).await?;

        assert!(db.table_exists("tenant_a", "items").await);
        assert!(!db.table_exists("public", "items").await);
        Ok(())
    })
    .await
}

struct SeedRoles;

#[async_trait]
impl Procedure for SeedRoles {
    async fn up(&self, tx: &mut dyn TransactionHandle) -> Result<()> {
        tx.execute("CREATE TABLE roles (name TEXT)").await?;
        let inserted = tx
            .execute("INSERT INTO roles VALUES ('admin'), ('viewer')")
            .await?;
        anyhow::ensure!(inserted == 2, "expected 2 roles, inserted {}", inserted);
        Ok(())
    }
}

#[tokio::test]
async fn test_procedural_migration() -> Result<()> {
    with_test_db(async |db| {
        let migrations = TempDir::new()?;
        write(&migrations, "V2__seed_roles.rs", "// compiled into the binary\n");

        let migrator = migrator(db, "public")
            .with_procedures(ProcedureRegistry::new().register("V2__seed_roles.rs", SeedRoles));
        migrator.baseline("1", None).await?;

        let report = migrator.migrate(migrations.path(), None).await?;
        assert_eq!(report.applied.len(), 1);

        let roles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(db.pool())
            .await?;
        assert_eq!(roles, 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_clean_drops_ledger() -> Result<()> {
    with_test_db(async |db| {
        let migrator = migrator(db, "public");
        migrator.baseline("3", Some("imported")).await?;

        migrator.clean().await?;

        assert_eq!(migrator.revision().await.version_label(), "Unknown");
        assert!(!db.table_exists("public", "pgrev_revisions").await);
        Ok(())
    })
    .await
}
