//! Index and query types
//!
//! This module defines the value objects callers hand to the store:
//! - IndexType / IndexSpec: declared secondary indexes
//! - Order: sort direction of a query
//! - QueryKind / QuerySpec: what to match and how to shape the results
//!
//! It also fixes how JSON values map onto typed index columns. The same
//! conversion is used for stored values and for query keys, so a `text`
//! index compares lexically and `integer`/`floating` indexes compare
//! numerically.

use crate::error::{Error, Result};
use crate::json::SoupPath;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Surrogate id assigned to a document at creation
pub type SoupEntryId = i64;

// =============================================================================
// IndexType / IndexSpec
// =============================================================================

/// Declared type of an index column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Lexically compared text
    Text,
    /// Numerically compared 64-bit integer
    Integer,
    /// Numerically compared double
    Floating,
}

impl IndexType {
    /// Name persisted in the index catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Text => "text",
            IndexType::Integer => "integer",
            IndexType::Floating => "floating",
        }
    }

    /// Column type used in the backing table DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            IndexType::Text => "TEXT",
            IndexType::Integer => "INTEGER",
            IndexType::Floating => "REAL",
        }
    }

    /// Value stored in the index column for a projected document value
    ///
    /// Never fails: values that do not fit the declared type are stored as
    /// text (strings raw, anything else as its JSON text), and absent or
    /// `null` values are stored as NULL.
    pub fn column_value(&self, projected: Option<&Value>) -> SqlValue {
        match projected {
            None | Some(Value::Null) => SqlValue::Null,
            Some(value) => self.typed(value).unwrap_or_else(|| match value {
                Value::String(s) => SqlValue::Text(s.clone()),
                other => SqlValue::Text(other.to_string()),
            }),
        }
    }

    /// Convert a query key to the column's type
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` for `null` keys and for keys that cannot be
    /// compared with this index type (e.g. `"abc"` against an integer index).
    pub fn key_value(&self, key: &Value) -> Result<SqlValue> {
        if key.is_null() {
            return Err(Error::invalid_query("query key must not be null"));
        }
        self.typed(key).ok_or_else(|| {
            Error::invalid_query(format!(
                "key {} cannot be compared with a {} index",
                key, self
            ))
        })
    }

    fn typed(&self, value: &Value) -> Option<SqlValue> {
        match (self, value) {
            (_, Value::Null) | (_, Value::Array(_)) | (_, Value::Object(_)) => None,

            (IndexType::Text, Value::String(s)) => Some(SqlValue::Text(s.clone())),
            (IndexType::Text, other) => Some(SqlValue::Text(other.to_string())),

            (IndexType::Integer, Value::Number(n)) => Some(match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64()?),
            }),
            (IndexType::Integer, Value::String(s)) => {
                let trimmed = s.trim();
                match trimmed.parse::<i64>() {
                    Ok(i) => Some(SqlValue::Integer(i)),
                    Err(_) => trimmed.parse::<f64>().ok().map(SqlValue::Real),
                }
            }
            (IndexType::Integer, Value::Bool(b)) => Some(SqlValue::Integer(i64::from(*b))),

            (IndexType::Floating, Value::Number(n)) => n.as_f64().map(SqlValue::Real),
            (IndexType::Floating, Value::String(s)) => {
                s.trim().parse::<f64>().ok().map(SqlValue::Real)
            }
            (IndexType::Floating, Value::Bool(b)) => {
                Some(SqlValue::Real(if *b { 1.0 } else { 0.0 }))
            }
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(IndexType::Text),
            "integer" => Ok(IndexType::Integer),
            "floating" => Ok(IndexType::Floating),
            other => Err(Error::invalid_input(format!(
                "unknown index type '{}'. Expected \"text\", \"integer\" or \"floating\"",
                other
            ))),
        }
    }
}

/// A declared secondary index: `{path, type}`
///
/// Each index spec becomes exactly one column of the soup's backing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Slash-delimited path into stored documents
    pub path: String,
    /// Declared column type
    #[serde(rename = "type")]
    pub index_type: IndexType,
}

impl IndexSpec {
    /// Create an index spec
    pub fn new(path: impl Into<String>, index_type: IndexType) -> Self {
        IndexSpec {
            path: path.into(),
            index_type,
        }
    }

    /// Text index on `path`
    pub fn text(path: impl Into<String>) -> Self {
        Self::new(path, IndexType::Text)
    }

    /// Integer index on `path`
    pub fn integer(path: impl Into<String>) -> Self {
        Self::new(path, IndexType::Integer)
    }

    /// Floating-point index on `path`
    pub fn floating(path: impl Into<String>) -> Self {
        Self::new(path, IndexType::Floating)
    }
}

// =============================================================================
// Order / QueryKind / QuerySpec
// =============================================================================

/// Sort direction of query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Smallest indexed value first
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    /// Largest indexed value first
    #[serde(alias = "desc")]
    Descending,
}

impl Order {
    /// SQL keyword for ORDER BY
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

/// What a query matches on the indexed column
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    /// Every document in the soup
    All,
    /// `column = key`
    Exact(Value),
    /// `column >= begin AND column <= end`
    Range {
        /// Inclusive lower bound
        begin: Value,
        /// Inclusive upper bound
        end: Value,
    },
    /// `column LIKE pattern` (`%` and `_` wildcards)
    Like(String),
}

/// A query over one indexed path of one soup
///
/// Not persisted. `path` must name an index declared on the queried soup.
///
/// # Examples
///
/// ```
/// use smartstore_core::types::{Order, QueryKind, QuerySpec};
/// use serde_json::json;
///
/// // endKey omitted: exact match
/// let q = QuerySpec::from_keys("name", json!("Ann"), None, Order::Ascending);
/// assert_eq!(q.kind, QueryKind::Exact(json!("Ann")));
///
/// let q = QuerySpec::range("age", json!(3), json!(7), Order::Descending);
/// assert!(matches!(q.kind, QueryKind::Range { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuerySpec", into = "RawQuerySpec")]
pub struct QuerySpec {
    /// Indexed path, looked up verbatim in the catalog
    pub path: String,
    /// Predicate on the indexed column
    pub kind: QueryKind,
    /// Sort direction on the indexed column
    pub order: Order,
    /// Paths to extract instead of returning whole documents
    pub projections: Option<Vec<SoupPath>>,
    /// Page size for paged queries
    pub page_size: Option<usize>,
}

impl QuerySpec {
    fn with_kind(path: impl Into<String>, kind: QueryKind, order: Order) -> Self {
        QuerySpec {
            path: path.into(),
            kind,
            order,
            projections: None,
            page_size: None,
        }
    }

    /// Build from begin/end keys: a missing `end` or `end == begin` gives an
    /// exact match, anything else a closed range.
    pub fn from_keys(
        path: impl Into<String>,
        begin: Value,
        end: Option<Value>,
        order: Order,
    ) -> Self {
        let kind = match end {
            None => QueryKind::Exact(begin),
            Some(end) if end == begin => QueryKind::Exact(begin),
            Some(end) => QueryKind::Range { begin, end },
        };
        Self::with_kind(path, kind, order)
    }

    /// Documents whose indexed value equals `key`
    pub fn exact(path: impl Into<String>, key: Value, order: Order) -> Self {
        Self::with_kind(path, QueryKind::Exact(key), order)
    }

    /// Documents whose indexed value lies in `[begin, end]`
    pub fn range(path: impl Into<String>, begin: Value, end: Value, order: Order) -> Self {
        Self::from_keys(path, begin, Some(end), order)
    }

    /// Documents whose indexed value matches a LIKE pattern
    pub fn like(path: impl Into<String>, pattern: impl Into<String>, order: Order) -> Self {
        Self::with_kind(path, QueryKind::Like(pattern.into()), order)
    }

    /// Every document, ordered by the indexed value
    pub fn all(path: impl Into<String>, order: Order) -> Self {
        Self::with_kind(path, QueryKind::All, order)
    }

    /// Return only these paths from each matching document
    pub fn with_projections<I, S>(mut self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = paths
            .into_iter()
            .map(|p| SoupPath::parse(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.projections = Some(parsed);
        Ok(self)
    }

    /// Split results into pages of `page_size`
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Query specs as a bridge sends them
///
/// ```json
/// {"queryType": "range", "indexPath": "age", "beginKey": 3, "endKey": 7,
///  "order": "ascending", "pageSize": 10, "projections": ["name"]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuerySpec {
    query_type: String,
    index_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    begin_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    like_key: Option<String>,
    #[serde(default)]
    order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    projections: Option<Vec<SoupPath>>,
}

impl TryFrom<RawQuerySpec> for QuerySpec {
    type Error = Error;

    fn try_from(raw: RawQuerySpec) -> Result<Self> {
        let missing = |field: &str| {
            Error::invalid_query(format!(
                "{} query requires \"{}\"",
                raw.query_type, field
            ))
        };
        let kind = match raw.query_type.as_str() {
            "all" => QueryKind::All,
            "exact" => QueryKind::Exact(raw.begin_key.clone().ok_or_else(|| missing("beginKey"))?),
            "range" => {
                let begin = raw.begin_key.clone().ok_or_else(|| missing("beginKey"))?;
                match raw.end_key.clone() {
                    Some(end) if end != begin => QueryKind::Range { begin, end },
                    _ => QueryKind::Exact(begin),
                }
            }
            "like" => QueryKind::Like(raw.like_key.clone().ok_or_else(|| missing("likeKey"))?),
            other => {
                return Err(Error::invalid_query(format!(
                    "unknown query type '{}'",
                    other
                )))
            }
        };
        Ok(QuerySpec {
            path: raw.index_path,
            kind,
            order: raw.order,
            projections: raw.projections,
            page_size: raw.page_size,
        })
    }
}

impl From<QuerySpec> for RawQuerySpec {
    fn from(spec: QuerySpec) -> Self {
        let (query_type, begin_key, end_key, like_key) = match spec.kind {
            QueryKind::All => ("all", None, None, None),
            QueryKind::Exact(key) => ("exact", Some(key), None, None),
            QueryKind::Range { begin, end } => ("range", Some(begin), Some(end), None),
            QueryKind::Like(pattern) => ("like", None, None, Some(pattern)),
        };
        RawQuerySpec {
            query_type: query_type.to_string(),
            index_path: spec.path,
            begin_key,
            end_key,
            like_key,
            order: spec.order,
            page_size: spec.page_size,
            projections: spec.projections,
        }
    }
}
