//! CRUD engine: single-document lifecycle by surrogate id
//!
//! Every write recomputes all index columns from the new document and
//! stores them together with the serialized document in one transaction, so
//! index columns never drift from document content.
//!
//! Missing rows are not errors: `retrieve` returns `None`, `update` returns
//! `false`, `delete` does nothing.

use serde_json::Value;
use smartstore_core::{project, Error, Result, SoupEntryId, SqlValue};
use smartstore_storage::{in_transaction, Select};
use tracing::debug;

use crate::naming::{CREATED_COL, ID_COL, LAST_MODIFIED_COL, SOUP_COL};
use crate::ops::{ensure_object, now_millis, SoupOps};

const BY_ID: &str = "id = ?";

impl<'a> SoupOps<'a> {
    /// Insert a document; returns its new surrogate id
    pub fn create(&self, doc: &Value) -> Result<SoupEntryId> {
        ensure_object(doc)?;
        let now = now_millis();
        let mut values = vec![
            (SOUP_COL, SqlValue::Text(serde_json::to_string(doc)?)),
            (CREATED_COL, SqlValue::Integer(now)),
            (LAST_MODIFIED_COL, SqlValue::Integer(now)),
        ];
        values.extend(self.index_values(doc));

        let id = in_transaction(self.store, || self.store.insert(&self.schema.table, &values))?;
        debug!(soup = %self.schema.soup_name, id, "created document");
        Ok(id)
    }

    /// Fetch a document by id
    pub fn retrieve(&self, id: SoupEntryId) -> Result<Option<Value>> {
        let args = [SqlValue::Integer(id)];
        let rows = self
            .store
            .query(&Select::new(&self.schema.table, &[SOUP_COL]).filter(BY_ID, &args))?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(self.decode(id, row.into_iter().next())?)),
            None => Ok(None),
        }
    }

    /// Fetch several documents; missing ids are skipped, results in id order
    pub fn retrieve_many(&self, ids: &[SoupEntryId]) -> Result<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let where_clause = format!("{} IN ({})", ID_COL, placeholders);
        let args: Vec<SqlValue> = ids.iter().map(|id| SqlValue::Integer(*id)).collect();
        let rows = self.store.query(
            &Select::new(&self.schema.table, &[ID_COL, SOUP_COL])
                .filter(&where_clause, &args)
                .order_by(ID_COL),
        )?;
        rows.into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let id = cells.next().and_then(|v| v.as_i64()).unwrap_or_default();
                self.decode(id, cells.next())
            })
            .collect()
    }

    /// Replace the document stored under `id`
    ///
    /// Returns `false` if no row has that id.
    pub fn update(&self, id: SoupEntryId, doc: &Value) -> Result<bool> {
        ensure_object(doc)?;
        let mut values = vec![
            (SOUP_COL, SqlValue::Text(serde_json::to_string(doc)?)),
            (LAST_MODIFIED_COL, SqlValue::Integer(now_millis())),
        ];
        values.extend(self.index_values(doc));

        let args = [SqlValue::Integer(id)];
        let changed = in_transaction(self.store, || {
            self.store
                .update(&self.schema.table, &values, BY_ID, &args)
        })?;
        debug!(soup = %self.schema.soup_name, id, found = changed > 0, "updated document");
        Ok(changed > 0)
    }

    /// Create or update, matching on the indexed `external_id_path`
    ///
    /// No matching row (or no value at the path): create. One row: update
    /// it. Returns the id of the written row.
    ///
    /// # Errors
    ///
    /// `NoSuchIndex` if the path is not indexed, `AmbiguousMatch` if several
    /// rows match.
    pub fn upsert(&self, doc: &Value, external_id_path: &str) -> Result<SoupEntryId> {
        ensure_object(doc)?;
        let column = self.schema.column_for_path(external_id_path)?;
        let key = column
            .spec
            .index_type
            .column_value(project(doc, &column.path));
        if key.is_null() {
            return self.create(doc);
        }

        in_transaction(self.store, || {
            let where_clause = format!("{} = ?", column.quoted);
            let args = [key.clone()];
            let rows = self.store.query(
                &Select::new(&self.schema.table, &[ID_COL])
                    .filter(&where_clause, &args)
                    .page(2, 0),
            )?;
            let ids: Vec<SoupEntryId> = rows
                .into_iter()
                .filter_map(|row| row.first().and_then(SqlValue::as_i64))
                .collect();
            match ids.as_slice() {
                [] => self.create(doc),
                [id] => {
                    self.update(*id, doc)?;
                    Ok(*id)
                }
                _ => Err(Error::AmbiguousMatch {
                    soup: self.schema.soup_name.clone(),
                    path: external_id_path.to_string(),
                    count: self.count_where(&where_clause, &args)?,
                }),
            }
        })
    }

    /// Remove the document stored under `id`; no-op if there is none
    pub fn delete(&self, id: SoupEntryId) -> Result<()> {
        let args = [SqlValue::Integer(id)];
        let removed = in_transaction(self.store, || {
            self.store.delete(&self.schema.table, BY_ID, &args)
        })?;
        debug!(soup = %self.schema.soup_name, id, removed, "deleted document");
        Ok(())
    }

    /// Remove every document; returns how many were removed
    pub fn clear(&self) -> Result<usize> {
        in_transaction(self.store, || {
            self.store
                .execute(&format!("DELETE FROM {}", self.schema.table), &[])
        })
    }
}
