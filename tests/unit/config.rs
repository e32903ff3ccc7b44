use anyhow::Result;
use pgrev::config::{ConfigBuilder, DatabaseArgs, DirectoryArgs, load_config};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_file_values_and_root_dir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("pgrev.yaml");
    fs::write(
        &config_path,
        r#"
databases:
  target_url: postgres://localhost/app
directories:
  migrations_dir: db/migrations
migration:
  tracking_table:
    schema: app
    name: revisions
"#,
    )?;

    let (file_config, root_dir) = load_config(config_path.to_str().unwrap())?;
    let config = ConfigBuilder::new().with_file(file_config).resolve()?;

    assert_eq!(root_dir, temp_dir.path());
    assert_eq!(
        config.databases.target.as_deref(),
        Some("postgres://localhost/app")
    );
    assert_eq!(config.directories.migrations, "db/migrations");
    assert_eq!(config.migration.tracking_table.schema, "app");
    assert_eq!(config.migration.tracking_table.name, "revisions");

    Ok(())
}

#[test]
fn test_cli_args_override_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("pgrev.yaml");
    fs::write(
        &config_path,
        "databases:\n  target_url: postgres://localhost/app\ndirectories:\n  migrations_dir: sql\n",
    )?;

    let (file_config, _) = load_config(config_path.to_str().unwrap())?;
    let mut cli_config: pgrev::config::ConfigInput = DatabaseArgs {
        target_url: Some("postgres://prod/app".to_string()),
        schema: None,
    }
    .into();
    cli_config.directories = Some(
        DirectoryArgs {
            migrations_dir: Some("other".to_string()),
        }
        .into(),
    );

    let config = ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve()?;

    assert_eq!(config.databases.target.as_deref(), Some("postgres://prod/app"));
    assert_eq!(config.directories.migrations, "other");
    assert_eq!(config.migration.tracking_table.schema, "public");

    Ok(())
}

#[test]
fn test_unknown_config_keys_are_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("pgrev.yaml");
    fs::write(&config_path, "migration:\n  default_mode: safe_only\n")?;

    assert!(load_config(config_path.to_str().unwrap()).is_err());

    Ok(())
}
