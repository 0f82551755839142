//! Testing utilities for backing-store failures
//!
//! [`FaultyStore`] wraps any [`RelationalStore`] and fails the first
//! statement that matches an armed [`FaultPoint`]. Tests use it to check that
//! multi-statement operations (soup registration, batches) roll back
//! completely when one statement fails halfway.
//!
//! # Example
//!
//! ```ignore
//! use smartstore_storage::testing::{FaultPoint, FaultyStore};
//!
//! let store = FaultyStore::new(SqliteStore::open_in_memory()?);
//! store.arm(FaultPoint::Execute("CREATE INDEX".into()));
//! // the next CREATE INDEX fails with a StorageError
//! ```

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use smartstore_core::{Error, Result, SqlValue};

use crate::traits::{RelationalStore, Row, Select};

/// Where to inject a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultPoint {
    /// `execute` whose SQL contains this text
    Execute(String),
    /// `insert` into this table
    Insert(String),
    /// `update` of this table
    Update(String),
    /// `delete` from this table
    Delete(String),
    /// `query` on this table
    Query(String),
}

/// Store wrapper that injects one failure per arming
pub struct FaultyStore<S> {
    inner: S,
    armed: Mutex<Option<FaultPoint>>,
    injected: AtomicUsize,
}

impl<S: RelationalStore> FaultyStore<S> {
    /// Wrap `inner` with no fault armed
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            armed: Mutex::new(None),
            injected: AtomicUsize::new(0),
        }
    }

    /// Fail the next statement matching `point`
    pub fn arm(&self, point: FaultPoint) {
        *self.armed.lock() = Some(point);
    }

    /// Clear any armed fault
    pub fn disarm(&self) {
        *self.armed.lock() = None;
    }

    /// Number of failures injected so far
    pub fn injected(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn trip(&self, hit: impl Fn(&FaultPoint) -> bool) -> Result<()> {
        let mut armed = self.armed.lock();
        if armed.as_ref().map_or(false, hit) {
            let point = armed.take();
            self.injected.fetch_add(1, Ordering::SeqCst);
            return Err(Error::storage(io::Error::new(
                io::ErrorKind::Other,
                format!("injected fault at {:?}", point),
            )));
        }
        Ok(())
    }
}

impl<S: RelationalStore> RelationalStore for FaultyStore<S> {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<usize> {
        self.trip(|p| matches!(p, FaultPoint::Execute(text) if sql.contains(text.as_str())))?;
        self.inner.execute(sql, args)
    }

    fn query(&self, select: &Select<'_>) -> Result<Vec<Row>> {
        self.trip(|p| matches!(p, FaultPoint::Query(t) if t == select.table))?;
        self.inner.query(select)
    }

    fn insert(&self, table: &str, values: &[(&str, SqlValue)]) -> Result<i64> {
        self.trip(|p| matches!(p, FaultPoint::Insert(t) if t == table))?;
        self.inner.insert(table, values)
    }

    fn update(
        &self,
        table: &str,
        values: &[(&str, SqlValue)],
        where_clause: &str,
        where_args: &[SqlValue],
    ) -> Result<usize> {
        self.trip(|p| matches!(p, FaultPoint::Update(t) if t == table))?;
        self.inner.update(table, values, where_clause, where_args)
    }

    fn delete(&self, table: &str, where_clause: &str, where_args: &[SqlValue]) -> Result<usize> {
        self.trip(|p| matches!(p, FaultPoint::Delete(t) if t == table))?;
        self.inner.delete(table, where_clause, where_args)
    }

    fn transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        self.inner.transaction(work)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        self.inner.table_exists(table)
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        self.inner.table_columns(table)
    }
}
