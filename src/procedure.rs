//! Procedural migrations compiled into the binary.
//!
//! A `.rs` file in the migrations directory marks where a procedural step sits in the
//! version order and provides the checksum; the code that runs is the [`Procedure`]
//! registered under the same file name. Nothing is loaded from disk at runtime.

use crate::db::TransactionHandle;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[async_trait]
pub trait Procedure: Send + Sync {
    /// Apply the migration; returning an error rolls the transaction back
    async fn up(&self, tx: &mut dyn TransactionHandle) -> Result<()>;
}

/// Procedures keyed by the script basename they implement, e.g. "V2__backfill.rs"
#[derive(Clone, Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<String, Arc<dyn Procedure>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure, replacing any previous one for the same script
    pub fn register<P>(mut self, script: impl Into<String>, procedure: P) -> Self
    where
        P: Procedure + 'static,
    {
        self.procedures.insert(script.into(), Arc::new(procedure));
        self
    }

    pub fn get(&self, script: &str) -> Option<Arc<dyn Procedure>> {
        self.procedures.get(script).cloned()
    }

    pub fn scripts(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.scripts()).finish()
    }
}
