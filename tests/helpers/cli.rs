use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch project directory for running the pgrev binary
pub struct CliTestHelper {
    pub temp_dir: TempDir,
    pub project_root: PathBuf,
}

impl CliTestHelper {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_root = temp_dir.path().to_path_buf();
        Ok(Self {
            temp_dir,
            project_root,
        })
    }

    /// Command running in the project root with no database configured from the environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pgrev").expect("pgrev binary should be built");
        cmd.current_dir(&self.project_root)
            .env_remove("TARGET_DATABASE_URL")
            .env_remove("DATABASE_URL")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.project_root.join("migrations")
    }

    pub fn write_migration(&self, name: &str, sql: &str) -> Result<PathBuf> {
        let dir = self.migrations_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, sql)?;
        Ok(path)
    }

    pub fn write_config(&self, yaml: &str) -> Result<()> {
        fs::write(self.project_root.join("pgrev.yaml"), yaml)?;
        Ok(())
    }
}

/// Run a CLI test in a fresh project directory
pub async fn with_cli_helper<F>(test_fn: F) -> Result<()>
where
    F: std::ops::AsyncFnOnce(&CliTestHelper) -> Result<()>,
{
    let helper = CliTestHelper::new()?;
    test_fn(&helper).await
}
