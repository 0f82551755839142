//! Index catalog: the persistent path → column mapping
//!
//! One metadata table, shared by all soups, holds a row per declared index:
//!
//! | soupName | path | columnName | columnType |
//! |----------|------|------------|------------|
//! | people   | name | people_0   | text       |
//!
//! The catalog is the only source of truth for which physical column backs a
//! path. Rows are written in the same transaction that creates the soup
//! table, and deleted in the same transaction that drops it.

use std::sync::Arc;

use smartstore_core::{Error, IndexType, Result, SqlValue};
use smartstore_storage::{RelationalStore, Row, Select};

use crate::naming::{quote_identifier, CATALOG_INDEX, CATALOG_TABLE};

/// One persisted catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Soup the index belongs to
    pub soup_name: String,
    /// Declared path
    pub path: String,
    /// Generated column name (unquoted)
    pub column_name: String,
    /// Declared type
    pub column_type: IndexType,
}

/// Access to the `soup_index_map` table
#[derive(Clone)]
pub struct IndexCatalog {
    store: Arc<dyn RelationalStore>,
    table: String,
}

impl IndexCatalog {
    /// Catalog on `store`; call [`IndexCatalog::ensure_table`] before use
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        IndexCatalog {
            store,
            table: quote_identifier(CATALOG_TABLE),
        }
    }

    /// Create the catalog table if it does not exist yet
    pub fn ensure_table(&self) -> Result<()> {
        self.store.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 soupName TEXT NOT NULL, \
                 path TEXT NOT NULL, \
                 columnName TEXT NOT NULL, \
                 columnType TEXT NOT NULL, \
                 UNIQUE (soupName, path))",
                self.table
            ),
            &[],
        )?;
        self.store.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (soupName)",
                quote_identifier(CATALOG_INDEX),
                self.table
            ),
            &[],
        )?;
        Ok(())
    }

    /// Insert one row per entry (caller provides the transaction)
    pub fn insert_entries(&self, entries: &[CatalogEntry]) -> Result<()> {
        for entry in entries {
            self.store.insert(
                &self.table,
                &[
                    ("soupName", SqlValue::from(entry.soup_name.as_str())),
                    ("path", SqlValue::from(entry.path.as_str())),
                    ("columnName", SqlValue::from(entry.column_name.as_str())),
                    ("columnType", SqlValue::from(entry.column_type.as_str())),
                ],
            )?;
        }
        Ok(())
    }

    /// All entries of a soup, in column generation order
    ///
    /// Empty when the soup is not registered.
    pub fn entries(&self, soup: &str) -> Result<Vec<CatalogEntry>> {
        let args = [SqlValue::from(soup)];
        let rows = self.store.query(
            &Select::new(&self.table, &["rowid", "path", "columnName", "columnType"])
                .filter("soupName = ?", &args)
                .order_by("rowid"),
        )?;
        rows.into_iter().map(|row| decode_entry(soup, row)).collect()
    }

    /// Delete every entry of a soup; returns how many were removed
    pub fn delete_entries(&self, soup: &str) -> Result<usize> {
        self.store
            .delete(&self.table, "soupName = ?", &[SqlValue::from(soup)])
    }

    /// Names of every soup with at least one entry, sorted
    pub fn soup_names(&self) -> Result<Vec<String>> {
        let rows = self.store.query(
            &Select::new(&self.table, &["DISTINCT soupName"]).order_by("soupName"),
        )?;
        rows.into_iter()
            .map(|row| {
                row.into_iter().next().and_then(SqlValue::into_text).ok_or_else(|| Error::Corruption {
                    soup: CATALOG_TABLE.to_string(),
                    id: 0,
                    reason: "soupName is not text".to_string(),
                })
            })
            .collect()
    }
}

fn decode_entry(soup: &str, row: Row) -> Result<CatalogEntry> {
    let mut cells = row.into_iter();
    let rowid = cells.next().and_then(|v| v.as_i64()).unwrap_or_default();
    let corrupt = |what: &str| Error::Corruption {
        soup: soup.to_string(),
        id: rowid,
        reason: format!("catalog {} is not text", what),
    };
    let path = cells.next().and_then(SqlValue::into_text).ok_or_else(|| corrupt("path"))?;
    let column_name = cells
        .next()
        .and_then(SqlValue::into_text)
        .ok_or_else(|| corrupt("columnName"))?;
    let column_type = cells
        .next()
        .and_then(SqlValue::into_text)
        .ok_or_else(|| corrupt("columnType"))?
        .parse::<IndexType>()
        .map_err(|e| Error::Corruption {
            soup: soup.to_string(),
            id: rowid,
            reason: e.to_string(),
        })?;
    Ok(CatalogEntry {
        soup_name: soup.to_string(),
        path,
        column_name,
        column_type,
    })
}
