use super::error_context::SqlErrorContext;
use crate::migration_tracking::quote_identifier;
use crate::procedure::Procedure;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Executor, PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, warn};

/// A live transaction handed to procedural migrations.
#[async_trait]
pub trait TransactionHandle: Send {
    /// Schema the migration runs against; it is first on the search path
    fn schema(&self) -> &str;

    /// Run one or more SQL statements inside the transaction, returning affected rows
    async fn execute(&mut self, sql: &str) -> Result<u64>;
}

/// Executes migration scripts, each inside its own transaction.
///
/// A failed script must leave nothing behind: the transaction is rolled back before
/// the error is returned.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute_script_in_transaction(&self, sql: &str) -> Result<()>;

    async fn execute_procedure_in_transaction(&self, procedure: &dyn Procedure) -> Result<()>;

    /// Release connections; safe to call more than once
    async fn shutdown(&self);
}

/// PostgreSQL transport scoped to one schema
#[derive(Debug, Clone)]
pub struct PgTransport {
    pool: PgPool,
    schema: String,
}

struct PgTransactionHandle<'a> {
    conn: &'a mut PgConnection,
    schema: &'a str,
}

#[async_trait]
impl TransactionHandle for PgTransactionHandle<'_> {
    fn schema(&self) -> &str {
        self.schema
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        let result = (&mut *self.conn)
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| anyhow::anyhow!(SqlErrorContext::from_sqlx_error(&e, sql).summary()))?;
        Ok(result.rows_affected())
    }
}

impl PgTransport {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        let search_path = quote_identifier(&self.schema)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(&format!("SET LOCAL search_path TO {}, public", search_path))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to set search_path to {}", search_path))?;

        Ok(tx)
    }
}

async fn rollback_quietly(tx: Transaction<'static, Postgres>) {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback failed: {}", e);
    }
}

#[async_trait]
impl Transport for PgTransport {
    async fn execute_script_in_transaction(&self, sql: &str) -> Result<()> {
        let mut tx = self.begin().await?;

        match (&mut *tx).execute(sqlx::raw_sql(sql)).await {
            Ok(result) => {
                tx.commit().await.context("Failed to commit transaction")?;
                debug!("Script committed ({} rows affected)", result.rows_affected());
                Ok(())
            }
            Err(e) => {
                let ctx = SqlErrorContext::from_sqlx_error(&e, sql);
                debug!("{}", ctx.format("migration script", sql));
                rollback_quietly(tx).await;
                Err(anyhow::anyhow!(ctx.summary()))
            }
        }
    }

    async fn execute_procedure_in_transaction(&self, procedure: &dyn Procedure) -> Result<()> {
        let mut tx = self.begin().await?;

        let outcome = {
            let mut handle = PgTransactionHandle {
                conn: &mut *tx,
                schema: &self.schema,
            };
            procedure.up(&mut handle).await
        };

        match outcome {
            Ok(()) => {
                tx.commit().await.context("Failed to commit transaction")?;
                Ok(())
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    async fn shutdown(&self) {
        self.pool.close().await;
    }
}
