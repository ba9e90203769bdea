use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{
    error::Result,
    sql::{executor::ResultSet, parser::parse, plan::Plan},
    storage::{engine::Engine, memory::MemoryEngine},
};

/// SQL engine: runs statement text against a table registry
///
/// The engine owns the registry; every statement runs to completion before
/// the next one starts.
#[derive(Debug, Default)]
pub struct SqlEngine<E: Engine> {
    storage: E,
}

impl SqlEngine<MemoryEngine> {
    pub fn in_memory() -> Self {
        Self::new(MemoryEngine::new())
    }
}

impl<E: Engine + 'static> SqlEngine<E> {
    pub fn new(storage: E) -> Self {
        Self { storage }
    }

    /// Executes a SQL statement
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        debug!(sql, "executing statement");
        let stmt = parse(sql)?;
        let result = Plan::build(stmt)?.execute(&mut self.storage);
        match &result {
            Ok(set) => debug!(rows = set.row_count(), "statement succeeded"),
            Err(err) => debug!(error = %err, "statement failed"),
        }
        result
    }

    pub fn storage(&self) -> &E {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut E {
        &mut self.storage
    }

    pub fn into_storage(self) -> E {
        self.storage
    }
}

/// Cloneable handle serializing access to one engine
///
/// Each statement holds the lock for its whole execution.
pub struct SharedEngine<E: Engine> {
    inner: Arc<Mutex<SqlEngine<E>>>,
}

impl<E: Engine> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Engine + 'static> SharedEngine<E> {
    pub fn new(engine: SqlEngine<E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn execute(&self, sql: &str) -> Result<ResultSet> {
        self.inner.lock()?.execute(sql)
    }

    /// Runs a closure with exclusive access to the engine
    pub fn with<T>(&self, f: impl FnOnce(&mut SqlEngine<E>) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.lock()?;
        f(&mut *guard)
    }
}
