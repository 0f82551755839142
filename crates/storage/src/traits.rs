//! The relational backing-store contract
//!
//! SmartStore keeps every soup in an ordinary relational table. This module
//! defines the small slice of a SQL engine the engine crate relies on, so the
//! SQLite implementation can be swapped (or wrapped, see `testing`) without
//! touching upper layers.

use smartstore_core::{Error, Result, SqlValue};

/// One result row, columns in the order they were selected
pub type Row = Vec<SqlValue>;

/// A single-table SELECT
///
/// `columns` are raw SQL expressions (`id`, `COUNT(*)`, a quoted column
/// name). Every value goes through `where_args`; only identifiers produced by
/// the engine's naming functions are interpolated into the SQL text.
#[derive(Debug, Clone, Default)]
pub struct Select<'a> {
    /// Table (already quoted)
    pub table: &'a str,
    /// Selected column expressions
    pub columns: &'a [&'a str],
    /// WHERE clause with `?` placeholders
    pub where_clause: Option<&'a str>,
    /// Values bound to the placeholders, in order
    pub where_args: &'a [SqlValue],
    /// ORDER BY clause
    pub order_by: Option<&'a str>,
    /// LIMIT
    pub limit: Option<usize>,
    /// OFFSET (only applied together with `limit`)
    pub offset: Option<usize>,
}

impl<'a> Select<'a> {
    /// Select `columns` from `table`
    pub fn new(table: &'a str, columns: &'a [&'a str]) -> Self {
        Select {
            table,
            columns,
            ..Default::default()
        }
    }

    /// Add a WHERE clause and its arguments
    pub fn filter(mut self, where_clause: &'a str, where_args: &'a [SqlValue]) -> Self {
        self.where_clause = Some(where_clause);
        self.where_args = where_args;
        self
    }

    /// Add an ORDER BY clause
    pub fn order_by(mut self, order_by: &'a str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// Limit the number of rows, skipping `offset` rows first
    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Render the statement with `?` placeholders
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        if let Some(clause) = self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        if let Some(order_by) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }
        sql
    }
}

/// Transactional relational store
///
/// Thread safety: implementations must be `Send + Sync`. A transaction must
/// keep statements issued by other threads out until it finishes.
///
/// `transaction` takes a closure rather than exposing begin/end calls, so a
/// transaction can never be left open. Transactions nest: an inner
/// transaction that fails rolls back only its own work, and the error still
/// propagates to the outer one.
pub trait RelationalStore: Send + Sync {
    /// Execute a DDL or DML statement
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the statement fails.
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<usize>;

    /// Run a SELECT and materialize every row
    fn query(&self, select: &Select<'_>) -> Result<Vec<Row>>;

    /// Insert one row; returns the new row id
    fn insert(&self, table: &str, values: &[(&str, SqlValue)]) -> Result<i64>;

    /// Update matching rows; returns the affected row count
    fn update(
        &self,
        table: &str,
        values: &[(&str, SqlValue)],
        where_clause: &str,
        where_args: &[SqlValue],
    ) -> Result<usize>;

    /// Delete matching rows; returns the affected row count
    fn delete(&self, table: &str, where_clause: &str, where_args: &[SqlValue]) -> Result<usize>;

    /// Run `work` in a transaction: commit on `Ok`, roll back on `Err`
    fn transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()>;

    /// Whether a table with this (unquoted) name exists
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Column names of a table, in declaration order
    fn table_columns(&self, table: &str) -> Result<Vec<String>>;
}

/// Run `work` in a transaction on `store` and return its value
///
/// # Example
///
/// ```ignore
/// let id = in_transaction(&*store, || {
///     let id = store.insert("\"people\"", &values)?;
///     Ok(id)
/// })?;
/// ```
pub fn in_transaction<S, T, F>(store: &S, work: F) -> Result<T>
where
    S: RelationalStore + ?Sized,
    F: FnOnce() -> Result<T>,
{
    let mut work = Some(work);
    let mut output = None;
    store.transaction(&mut || {
        if let Some(work) = work.take() {
            output = Some(work()?);
        }
        Ok(())
    })?;
    output.ok_or_else(|| {
        Error::storage(std::io::Error::new(
            std::io::ErrorKind::Other,
            "transaction completed without running its work",
        ))
    })
}
