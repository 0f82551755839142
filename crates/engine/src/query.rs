//! Query engine: single-index scans
//!
//! A [`QuerySpec`] compiles to exactly one SELECT over the soup table:
//!
//! ```text
//! SELECT id, soup FROM <table>
//!  WHERE <column> = ?                       -- exact
//!        <column> >= ? AND <column> <= ?    -- range
//!        <column> LIKE ?                    -- like
//!                                           -- all: no WHERE
//!  ORDER BY <column> <dir>, id <dir>
//!  [LIMIT page_size OFFSET page_index * page_size]
//! ```
//!
//! Keys are converted to the index column's declared type before binding
//! (see `IndexType::key_value`), so text indexes compare lexically and
//! numeric indexes numerically.

use serde_json::Value;
use smartstore_core::{build_projection, Error, QueryKind, QuerySpec, Result, SqlValue};
use smartstore_storage::Select;
use tracing::debug;

use crate::naming::{ID_COL, SOUP_COL};
use crate::ops::SoupOps;
use crate::registry::{IndexColumn, SoupSchema};

const RESULT_COLUMNS: &[&str] = &[ID_COL, SOUP_COL];

/// Largest LIMIT/OFFSET SQLite accepts (a signed 64-bit integer)
const MAX_SQL_BOUND: usize = i64::MAX as usize;

/// A query spec resolved against a soup schema
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery<'a> {
    /// Index column the query scans
    pub column: &'a IndexColumn,
    /// WHERE clause, `None` for a full scan
    pub where_clause: Option<String>,
    /// Bound keys
    pub args: Vec<SqlValue>,
    /// ORDER BY clause
    pub order_by: String,
}

/// Resolve `spec.path` and build the predicate
///
/// # Errors
///
/// `NoSuchIndex` if the path is not indexed in this soup, `InvalidQuery` if
/// a key cannot be compared with the column type.
pub fn compile<'a>(schema: &'a SoupSchema, spec: &QuerySpec) -> Result<CompiledQuery<'a>> {
    let column = schema.column_for_path(&spec.path)?;
    let quoted = &column.quoted;
    let index_type = column.spec.index_type;

    let (where_clause, args) = match &spec.kind {
        QueryKind::All => (None, Vec::new()),
        QueryKind::Exact(key) => (
            Some(format!("{} = ?", quoted)),
            vec![index_type.key_value(key)?],
        ),
        QueryKind::Range { begin, end } => (
            Some(format!("{q} >= ? AND {q} <= ?", q = quoted)),
            vec![index_type.key_value(begin)?, index_type.key_value(end)?],
        ),
        QueryKind::Like(pattern) => (
            Some(format!("{} LIKE ?", quoted)),
            vec![SqlValue::Text(pattern.clone())],
        ),
    };

    let direction = spec.order.as_sql();
    Ok(CompiledQuery {
        column,
        where_clause,
        args,
        order_by: format!("{} {dir}, {} {dir}", quoted, ID_COL, dir = direction),
    })
}

impl<'a> SoupOps<'a> {
    /// Run a query and return every match
    ///
    /// With `page_size` set, only the first page is returned; use
    /// [`SoupOps::query_page`] for later pages.
    pub fn query(&self, spec: &QuerySpec) -> Result<Vec<Value>> {
        self.query_page(spec, 0)
    }

    /// Run a query and return page `page_index` (zero-based)
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for a zero page size, or for a non-zero page index on
    /// an unpaged query.
    pub fn query_page(&self, spec: &QuerySpec, page_index: usize) -> Result<Vec<Value>> {
        let compiled = compile(self.schema, spec)?;
        let page = match spec.page_size {
            Some(0) => return Err(Error::invalid_query("page size must be positive")),
            Some(size) => Some((
                size.min(MAX_SQL_BOUND),
                page_index.saturating_mul(size).min(MAX_SQL_BOUND),
            )),
            None if page_index > 0 => {
                return Err(Error::invalid_query(
                    "page index given for a query without page size",
                ))
            }
            None => None,
        };

        let mut select = Select::new(&self.schema.table, RESULT_COLUMNS)
            .order_by(&compiled.order_by);
        if let Some(clause) = &compiled.where_clause {
            select = select.filter(clause, &compiled.args);
        }
        if let Some((limit, offset)) = page {
            select = select.page(limit, offset);
        }

        debug!(
            soup = %self.schema.soup_name,
            column = %compiled.column.column,
            where_clause = ?compiled.where_clause,
            "query"
        );
        let rows = self.store.query(&select)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = row.into_iter();
            let id = cells.next().and_then(|v| v.as_i64()).unwrap_or_default();
            let doc = self.decode(id, cells.next())?;
            results.push(match &spec.projections {
                Some(paths) => build_projection(&doc, paths),
                None => doc,
            });
        }
        Ok(results)
    }

    /// Number of documents the query matches (paging ignored)
    pub fn count(&self, spec: &QuerySpec) -> Result<usize> {
        let compiled = compile(self.schema, spec)?;
        match &compiled.where_clause {
            Some(clause) => self.count_where(clause, &compiled.args),
            None => self.count_where("1 = 1", &[]),
        }
    }

    pub(crate) fn count_where(&self, where_clause: &str, args: &[SqlValue]) -> Result<usize> {
        let rows = self.store.query(
            &Select::new(&self.schema.table, &["COUNT(*)"]).filter(where_clause, args),
        )?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(SqlValue::as_i64)
            .unwrap_or_default();
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
