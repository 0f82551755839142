//! Per-soup operations handle
//!
//! [`SoupOps`] pairs the backing store with one soup's schema. The CRUD
//! engine (`crud`) and the query engine (`query`) are implemented as methods
//! on it. Callers obtain one through `SoupRegistry::with_soup`, which holds
//! the soup's shared lock for as long as the handle lives.

use serde_json::Value;
use smartstore_core::{project, Error, Result, SoupEntryId, SqlValue};
use smartstore_storage::RelationalStore;

use crate::registry::SoupSchema;

/// Store + schema of one soup
#[derive(Clone, Copy)]
pub struct SoupOps<'a> {
    pub(crate) store: &'a dyn RelationalStore,
    pub(crate) schema: &'a SoupSchema,
}

impl<'a> SoupOps<'a> {
    /// Handle for `schema` on `store`
    pub fn new(store: &'a dyn RelationalStore, schema: &'a SoupSchema) -> Self {
        SoupOps { store, schema }
    }

    /// Schema this handle operates on
    pub fn schema(&self) -> &'a SoupSchema {
        self.schema
    }

    /// Value of every index column for `doc`, paired with its quoted column
    pub(crate) fn index_values(&self, doc: &Value) -> Vec<(&'a str, SqlValue)> {
        self.schema
            .indexes
            .iter()
            .map(|col| {
                (
                    col.quoted.as_str(),
                    col.spec.index_type.column_value(project(doc, &col.path)),
                )
            })
            .collect()
    }

    /// Parse a stored document column
    ///
    /// # Errors
    ///
    /// `Corruption` if the column is not text or not valid JSON.
    pub(crate) fn decode(&self, id: SoupEntryId, cell: Option<SqlValue>) -> Result<Value> {
        let corrupt = |reason: String| Error::Corruption {
            soup: self.schema.soup_name.clone(),
            id,
            reason,
        };
        match cell {
            Some(SqlValue::Text(text)) => {
                serde_json::from_str(&text).map_err(|e| corrupt(e.to_string()))
            }
            Some(other) => Err(corrupt(format!(
                "document column holds {} instead of TEXT",
                other.type_name()
            ))),
            None => Err(corrupt("document column missing from row".to_string())),
        }
    }
}

/// Reject documents that are not JSON objects
pub(crate) fn ensure_object(doc: &Value) -> Result<()> {
    if doc.is_object() {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "soup documents must be JSON objects, got {}",
            json_type(doc)
        )))
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Current time in epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
