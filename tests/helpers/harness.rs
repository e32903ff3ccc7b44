use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Connection to an external PostgreSQL server named by DATABASE_URL
pub struct PgTestInstance {
    pub base_url: String,
}

/// An isolated database created for one test
pub struct TestDatabase {
    pool: PgPool,
    url: String,
    db_name: String,
    base_url: String,
}

impl TestDatabase {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn table_exists(&self, schema: &str, table: &str) -> bool {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(schema)
        .bind(table)
        .fetch_one(&self.pool)
        .await
        .unwrap_or(false)
    }

    /// Cleanup the test database - best effort async cleanup
    pub async fn cleanup(self) {
        self.pool.close().await;

        let db_name = self.db_name.clone();
        let base_url = self.base_url.clone();

        let cleanup_future = async move {
            if let Ok(pool) = PgPool::connect(&base_url).await {
                let drop_sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", db_name);
                let _ = sqlx::query(&drop_sql).execute(&pool).await;
                pool.close().await;
            }
        };

        // Timeout after 5 seconds to prevent hanging
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), cleanup_future).await;
    }
}

impl PgTestInstance {
    /// None when DATABASE_URL is not set; database tests are skipped then
    pub fn from_env() -> Option<Self> {
        dotenv::dotenv().ok();
        std::env::var("DATABASE_URL")
            .ok()
            .map(|base_url| Self { base_url })
    }

    pub fn database_url(&self, db_name: &str) -> String {
        match self.base_url.rsplit_once('/') {
            Some((server, _)) => format!("{}/{}", server, db_name),
            None => format!("{}/{}", self.base_url, db_name),
        }
    }

    pub async fn create_test_database(&self) -> Result<TestDatabase> {
        let db_name = format!("pgrev_test_{}", Uuid::new_v4().simple());

        let base_pool = PgPool::connect(&self.base_url)
            .await
            .context("Failed to connect to PostgreSQL for database creation")?;
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name))
            .execute(&base_pool)
            .await
            .context("Failed to create test database")?;
        base_pool.close().await;

        let url = self.database_url(&db_name);
        let pool = PgPool::connect(&url)
            .await
            .context("Failed to connect to newly created test database")?;

        Ok(TestDatabase {
            pool,
            url,
            db_name,
            base_url: self.base_url.clone(),
        })
    }
}

/// Run a test against a fresh database that is dropped afterwards.
///
/// Without DATABASE_URL the test body is skipped and the test passes.
///
/// # Example
/// ```ignore
/// #[tokio::test]
/// async fn test_something() -> Result<()> {
///     with_test_db(async |db| {
///         assert!(!db.table_exists("public", "users").await);
///         Ok(())
///     })
///     .await
/// }
/// ```
pub async fn with_test_db<F>(test_fn: F) -> Result<()>
where
    F: std::ops::AsyncFnOnce(&TestDatabase) -> Result<()>,
{
    let Some(pg) = PgTestInstance::from_env() else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return Ok(());
    };
    let db = pg.create_test_database().await?;

    let result = test_fn(&db).await;

    // Cleanup happens here - best effort (ignore errors)
    db.cleanup().await;

    result
}
