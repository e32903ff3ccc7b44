//! End-to-end runs of the pgrev binary against a real database

use crate::helpers::cli::with_cli_helper;
use crate::helpers::harness::with_test_db;
use anyhow::Result;
use predicates::prelude::*;

#[tokio::test]
async fn test_baseline_migrate_info() -> Result<()> {
    with_test_db(async |db| {
        with_cli_helper(async |helper| {
            helper.write_migration("V2__users.sql", "CREATE TABLE users (id INT);")?;
            helper.write_migration("V2_1__posts.sql", "CREATE TABLE posts (id INT);")?;

            helper
                .command()
                .args(["baseline", "1", "--target-url", db.url()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Baselined at version 1"));

            helper
                .command()
                .args(["migrate", "--target-url", db.url()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Applied 2 migration(s)"))
                .stdout(predicate::str::contains("Current version: 2.1"));

            let output = helper
                .command()
                .args(["info", "--format", "json", "--target-url", db.url()])
                .output()?;
            assert!(output.status.success());
            let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
            assert_eq!(json["version"], "2.1");
            assert_eq!(json["migrations"][0]["script"], "V2_1__posts.sql");
            assert_eq!(json["migrations"][0]["status"], "success");

            Ok(())
        })
        .await
    })
    .await
}

#[tokio::test]
async fn test_failed_migrate_prints_table_then_repair() -> Result<()> {
    with_test_db(async |db| {
        with_cli_helper(async |helper| {
            helper.write_migration("V2__broken.sql", "CREATE TABLE (;")?;

            helper
                .command()
                .args(["baseline", "1", "--target-url", db.url()])
                .assert()
                .success();

            helper
                .command()
                .args(["migrate", "--target-url", db.url()])
                .assert()
                .failure()
                .stdout(predicate::str::contains("V2__broken.sql"))
                .stderr(predicate::str::contains("pgrev repair"));

            helper.write_migration("V2__broken.sql", "CREATE TABLE fixed (id INT);")?;

            helper
                .command()
                .args(["repair", "--target-url", db.url()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Repaired V2__broken.sql"))
                .stdout(predicate::str::contains("Current version: 2"));

            helper
                .command()
                .args(["clean", "--force", "--target-url", db.url()])
                .assert()
                .success();

            helper
                .command()
                .args(["info", "--target-url", db.url()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Unknown"));

            Ok(())
        })
        .await
    })
    .await
}
