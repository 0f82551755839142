//! Soup paths and the document projector
//!
//! This module defines how SmartStore looks inside a JSON document:
//! - SoupPath: a parsed, slash-delimited path (e.g. `address/city`)
//! - PathParseError: why a path string was rejected
//! - project: walk a document along a path
//! - build_projection: assemble a partial document from several paths
//!
//! # Path Syntax
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `` or `/` | Root (the whole document) |
//! | `name` | `doc.name` |
//! | `a/b` | `doc.a.b` |
//! | `/a/b` | `doc.a.b` (one leading slash is ignored) |
//!
//! Descent is strict: only object fields are followed. There is no array
//! indexing and no wildcard.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between path segments
pub const PATH_SEPARATOR: char = '/';

/// Error type for soup path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty segment (`a//b`, trailing `/`, or `//a`)
    #[error("empty path segment at position {0}")]
    EmptySegment(usize),
}

/// A parsed path into a JSON document
///
/// Parse once, project many times: the segment list is built at parse time
/// and reused for every document. The original string is kept because the
/// index catalog and projection output are keyed by it.
///
/// # Examples
///
/// ```
/// use smartstore_core::json::SoupPath;
///
/// let path: SoupPath = "address/city".parse().unwrap();
/// assert_eq!(path.segments(), &["address".to_string(), "city".to_string()]);
/// assert!(SoupPath::parse("/").unwrap().is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SoupPath {
    raw: String,
    segments: Vec<String>,
}

impl SoupPath {
    /// The root path, addressing the whole document
    pub fn root() -> Self {
        SoupPath::default()
    }

    /// Parse a slash-delimited path
    pub fn parse(raw: &str) -> Result<Self, PathParseError> {
        let body = raw.strip_prefix(PATH_SEPARATOR).unwrap_or(raw);
        if body.is_empty() {
            return Ok(SoupPath {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let offset = raw.len() - body.len();
        let mut segments = Vec::new();
        let mut position = offset;
        for segment in body.split(PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(PathParseError::EmptySegment(position));
            }
            segments.push(segment.to_string());
            position += segment.len() + 1;
        }

        Ok(SoupPath {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path exactly as the caller wrote it
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Field names, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for `""` and `"/"`
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of fields descended
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`SoupPath::is_root`]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for SoupPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoupPath::parse(s)
    }
}

impl fmt::Display for SoupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for SoupPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for SoupPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SoupPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Get the value at `path` within `doc`
///
/// Returns `None` if a field along the way is missing or an intermediate
/// value is not an object. A present JSON `null` is `Some(&Value::Null)`.
///
/// # Examples
///
/// ```
/// use smartstore_core::json::{project, SoupPath};
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": 5}, "list": [1, 2]});
/// let path = SoupPath::parse("a/b").unwrap();
/// assert_eq!(project(&doc, &path), Some(&json!(5)));
///
/// // arrays are not traversed
/// let path = SoupPath::parse("list/0").unwrap();
/// assert_eq!(project(&doc, &path), None);
/// ```
pub fn project<'a>(doc: &'a Value, path: &SoupPath) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.segments() {
        match current {
            Value::Object(fields) => current = fields.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Build a reduced document holding one entry per requested path
///
/// Keys are the path strings themselves (`"a/b"`), not nested objects.
/// Absent values are emitted as `null`.
pub fn build_projection(doc: &Value, paths: &[SoupPath]) -> Value {
    let mut out = Map::with_capacity(paths.len());
    for path in paths {
        let value = project(doc, path).cloned().unwrap_or(Value::Null);
        out.insert(path.as_str().to_string(), value);
    }
    Value::Object(out)
}
