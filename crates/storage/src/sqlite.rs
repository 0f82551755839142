//! SQLite backing store
//!
//! Implements [`RelationalStore`] on a single rusqlite connection (bundled
//! SQLite). The connection sits behind a
//! `parking_lot::ReentrantMutex<RefCell<Connection>>`: `transaction()` holds
//! the lock for the whole closure, and the closure re-acquires it on the same
//! thread for each statement. Other threads block until the transaction ends,
//! so their statements never land inside it.
//!
//! Transactions are SAVEPOINTs and therefore nest.

use std::cell::RefCell;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::ReentrantMutex;
use rusqlite::types::Value as RusqliteValue;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use smartstore_core::{Error, Result, SqlValue};
use tracing::{debug, warn};

use crate::traits::{RelationalStore, Row, Select};

// ============================================================================
// Options
// ============================================================================

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Write-ahead log
    #[default]
    Wal,
    /// Rollback journal, deleted at commit
    Delete,
    /// In-memory journal
    Memory,
}

impl JournalMode {
    fn pragma_value(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// Connection settings applied at open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteOptions {
    /// Journal mode
    pub journal_mode: JournalMode,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        SqliteOptions {
            journal_mode: JournalMode::Wal,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

// ============================================================================
// Value helpers
// ============================================================================

fn to_sql(v: &SqlValue) -> RusqliteValue {
    match v {
        SqlValue::Null => RusqliteValue::Null,
        SqlValue::Integer(i) => RusqliteValue::Integer(*i),
        SqlValue::Real(f) => RusqliteValue::Real(*f),
        SqlValue::Text(s) => RusqliteValue::Text(s.clone()),
    }
}

fn from_sql(v: RusqliteValue) -> SqlValue {
    match v {
        RusqliteValue::Null => SqlValue::Null,
        RusqliteValue::Integer(i) => SqlValue::Integer(i),
        RusqliteValue::Real(f) => SqlValue::Real(f),
        RusqliteValue::Text(s) => SqlValue::Text(s),
        RusqliteValue::Blob(b) => SqlValue::Text(String::from_utf8_lossy(&b).into_owned()),
    }
}

// ============================================================================
// SqliteStore
// ============================================================================

/// SQLite implementation of [`RelationalStore`]
pub struct SqliteStore {
    conn: ReentrantMutex<RefCell<Connection>>,
    savepoints: AtomicU64,
}

impl SqliteStore {
    /// Open (or create) a file-backed database
    pub fn open(path: impl AsRef<Path>, options: SqliteOptions) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(Error::storage)?;
        Self::configure(conn, options)
    }

    /// Open a private in-memory database (useful for tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::storage)?;
        Self::configure(
            conn,
            SqliteOptions {
                journal_mode: JournalMode::Memory,
                ..SqliteOptions::default()
            },
        )
    }

    fn configure(conn: Connection, options: SqliteOptions) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)
            .map_err(Error::storage)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", options.journal_mode.pragma_value(), |row| {
                row.get(0)
            })
            .map_err(Error::storage)?;
        debug!(journal_mode = %mode, "sqlite connection configured");
        Ok(SqliteStore {
            conn: ReentrantMutex::new(RefCell::new(conn)),
            savepoints: AtomicU64::new(0),
        })
    }

    /// Execute `f` with the underlying connection
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let guard = self.conn.lock();
        let conn = guard.borrow();
        f(&conn).map_err(Error::storage)
    }

    fn run(&self, sql: &str, args: &[SqlValue]) -> Result<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            stmt.execute(params_from_iter(args.iter().map(to_sql)))
        })
    }
}

impl RelationalStore for SqliteStore {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<usize> {
        debug!(target: "smartstore::sql", sql, "execute");
        self.run(sql, args)
    }

    fn query(&self, select: &Select<'_>) -> Result<Vec<Row>> {
        let sql = select.to_sql();
        let width = select.columns.len();
        debug!(target: "smartstore::sql", sql = %sql, "query");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let mapped = stmt.query_map(params_from_iter(select.where_args.iter().map(to_sql)), |row| {
                (0..width)
                    .map(|i| row.get::<_, RusqliteValue>(i).map(from_sql))
                    .collect::<rusqlite::Result<Row>>()
            })?;
            let rows = mapped.collect::<rusqlite::Result<Vec<Row>>>();
            rows
        })
    }

    fn insert(&self, table: &str, values: &[(&str, SqlValue)]) -> Result<i64> {
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            stmt.execute(params_from_iter(values.iter().map(|(_, v)| to_sql(v))))?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update(
        &self,
        table: &str,
        values: &[(&str, SqlValue)],
        where_clause: &str,
        where_args: &[SqlValue],
    ) -> Result<usize> {
        let assignments: Vec<String> = values.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(", "),
            where_clause
        );
        let args: Vec<SqlValue> = values
            .iter()
            .map(|(_, v)| v.clone())
            .chain(where_args.iter().cloned())
            .collect();
        self.run(&sql, &args)
    }

    fn delete(&self, table: &str, where_clause: &str, where_args: &[SqlValue]) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE {}", table, where_clause);
        self.run(&sql, where_args)
    }

    fn transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        // Held until the savepoint is released or rolled back.
        let guard = self.conn.lock();
        let name = format!("sp_{}", self.savepoints.fetch_add(1, Ordering::Relaxed));

        guard
            .borrow()
            .execute_batch(&format!("SAVEPOINT {}", name))
            .map_err(Error::storage)?;

        let rollback = |conn: &Connection| {
            let _ = conn.execute_batch(&format!(
                "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name};"
            ));
        };

        match work() {
            Ok(()) => {
                let conn = guard.borrow();
                match conn.execute_batch(&format!("RELEASE SAVEPOINT {}", name)) {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(savepoint = %name, error = %e, "release failed, rolling back");
                        rollback(&conn);
                        Err(Error::storage(e))
                    }
                }
            }
            Err(e) => {
                warn!(savepoint = %name, error = %e, "transaction rolled back");
                rollback(&guard.borrow());
                Err(e)
            }
        }
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )?;
            let count: i64 = stmt.query_row([table], |row| row.get(0))?;
            Ok(count > 0)
        })
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached("SELECT name FROM pragma_table_info(?) ORDER BY cid")?;
            let mapped = stmt.query_map([table], |row| row.get::<_, String>(0))?;
            let names = mapped.collect::<rusqlite::Result<Vec<String>>>();
            names
        })
    }
}
