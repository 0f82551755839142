//! Soup registry: schema lifecycle and the in-memory schema cache
//!
//! Registering a soup creates its backing table, one SQL index per declared
//! index column, and the catalog rows, all in one transaction. Dropping does
//! the reverse. A soup therefore never exists with a table but no catalog
//! rows, or the other way around.
//!
//! ## Locking
//!
//! Each soup has a `parking_lot::RwLock<()>` kept in a `DashMap`. Schema
//! changes (register, drop, clear) hold it exclusively; reads and writes of
//! documents hold it shared. The schema cache is only written while the
//! exclusive lock is held, right after the catalog transaction commits, so a
//! reader can never see a column mapping for a soup that has been dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use smartstore_core::{Error, IndexSpec, Result, SoupPath};
use smartstore_storage::{in_transaction, RelationalStore};
use tracing::{debug, info};

use crate::catalog::{CatalogEntry, IndexCatalog};
use crate::naming::{
    self, column_name, index_name, quote_identifier, table_name, CREATED_COL, ID_COL,
    LAST_MODIFIED_COL, SOUP_COL,
};
use crate::ops::SoupOps;

// =============================================================================
// SoupSchema
// =============================================================================

/// One index column of a soup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Declared index spec
    pub spec: IndexSpec,
    /// Parsed form of `spec.path`
    pub path: SoupPath,
    /// Column name, unquoted
    pub column: String,
    /// Column name, quoted for SQL
    pub quoted: String,
}

/// Physical layout of a soup, as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoupSchema {
    /// Soup name
    pub soup_name: String,
    /// Quoted table name
    pub table: String,
    /// Index columns in generation order
    pub indexes: Vec<IndexColumn>,
}

impl SoupSchema {
    fn from_entries(soup: &str, entries: Vec<CatalogEntry>) -> Result<Self> {
        let indexes = entries
            .into_iter()
            .map(|entry| {
                Ok(IndexColumn {
                    path: SoupPath::parse(&entry.path)?,
                    quoted: quote_identifier(&entry.column_name),
                    spec: IndexSpec::new(entry.path, entry.column_type),
                    column: entry.column_name,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SoupSchema {
            soup_name: soup.to_string(),
            table: table_name(soup),
            indexes,
        })
    }

    /// Index column declared for exactly this path string
    pub fn column_for_path(&self, path: &str) -> Result<&IndexColumn> {
        self.indexes
            .iter()
            .find(|c| c.spec.path == path)
            .ok_or_else(|| Error::NoSuchIndex {
                soup: self.soup_name.clone(),
                path: path.to_string(),
            })
    }

    /// Declared index specs in column order
    pub fn index_specs(&self) -> Vec<IndexSpec> {
        self.indexes.iter().map(|c| c.spec.clone()).collect()
    }
}

// =============================================================================
// SoupRegistry
// =============================================================================

/// Owns soup schemas: DDL, catalog rows, cache and per-soup locks
pub struct SoupRegistry {
    store: Arc<dyn RelationalStore>,
    catalog: IndexCatalog,
    cache: Option<RwLock<HashMap<String, Arc<SoupSchema>>>>,
    locks: DashMap<String, Arc<RwLock<()>>>,
}

impl SoupRegistry {
    /// Registry on `store`; creates the catalog table if needed
    pub fn new(store: Arc<dyn RelationalStore>, cache_catalog: bool) -> Result<Self> {
        let catalog = IndexCatalog::new(Arc::clone(&store));
        catalog.ensure_table()?;
        Ok(SoupRegistry {
            store,
            catalog,
            cache: cache_catalog.then(|| RwLock::new(HashMap::new())),
            locks: DashMap::new(),
        })
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn RelationalStore> {
        &self.store
    }

    fn soup_lock(&self, soup: &str) -> Arc<RwLock<()>> {
        Arc::clone(self.locks.entry(soup.to_string()).or_default().value())
    }

    fn cached(&self, soup: &str) -> Option<Arc<SoupSchema>> {
        self.cache.as_ref()?.read().get(soup).cloned()
    }

    /// Schema from the cache or the catalog; caller holds the soup lock
    ///
    /// A schema read from the catalog is cached, so soups registered in an
    /// earlier session hit the catalog once.
    fn load(&self, soup: &str) -> Result<Option<Arc<SoupSchema>>> {
        if let Some(schema) = self.cached(soup) {
            return Ok(Some(schema));
        }
        let entries = self.catalog.entries(soup)?;
        if entries.is_empty() {
            return Ok(None);
        }
        let schema = Arc::new(SoupSchema::from_entries(soup, entries)?);
        if let Some(cache) = &self.cache {
            cache
                .write()
                .insert(soup.to_string(), Arc::clone(&schema));
        }
        Ok(Some(schema))
    }

    fn require(&self, soup: &str) -> Result<Arc<SoupSchema>> {
        self.load(soup)?
            .ok_or_else(|| Error::NoSuchSoup(soup.to_string()))
    }

    /// Schema of a registered soup
    ///
    /// # Errors
    ///
    /// `NoSuchSoup` if the soup is not registered.
    pub fn schema(&self, soup: &str) -> Result<Arc<SoupSchema>> {
        let lock = self.soup_lock(soup);
        let _shared = lock.read();
        self.require(soup)
    }

    /// Whether the soup is registered
    pub fn has_soup(&self, soup: &str) -> Result<bool> {
        let lock = self.soup_lock(soup);
        let _shared = lock.read();
        Ok(self.load(soup)?.is_some())
    }

    /// Names of all registered soups, sorted
    pub fn soup_names(&self) -> Result<Vec<String>> {
        self.catalog.soup_names()
    }

    /// Declared index specs of a soup, in column order
    pub fn index_specs(&self, soup: &str) -> Result<Vec<IndexSpec>> {
        Ok(self.schema(soup)?.index_specs())
    }

    /// Physical column backing `path` in `soup`
    ///
    /// # Errors
    ///
    /// `NoSuchSoup` if the soup is not registered, `NoSuchIndex` if it has no
    /// index on exactly this path string.
    pub fn column_name_for_path(&self, soup: &str, path: &str) -> Result<String> {
        Ok(self.schema(soup)?.column_for_path(path)?.column.clone())
    }

    /// Create a soup's table, indexes and catalog rows
    ///
    /// No-op if the soup already exists.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a bad soup name, an empty spec list or a repeated
    /// path; `InvalidPath` for a malformed path; `StorageError` if any DDL
    /// statement fails (nothing is left behind in that case).
    pub fn register_soup(&self, soup: &str, specs: &[IndexSpec]) -> Result<()> {
        naming::validate_soup_name(soup)?;
        if specs.is_empty() {
            return Err(Error::invalid_input(format!(
                "soup '{}' needs at least one index spec",
                soup
            )));
        }
        let mut seen = HashSet::new();
        for spec in specs {
            SoupPath::parse(&spec.path)?;
            if !seen.insert(spec.path.as_str()) {
                return Err(Error::invalid_input(format!(
                    "path '{}' is declared twice for soup '{}'",
                    spec.path, soup
                )));
            }
        }

        let lock = self.soup_lock(soup);
        let _exclusive = lock.write();

        if self.load(soup)?.is_some() {
            debug!(soup, "register_soup: already registered");
            return Ok(());
        }

        let entries: Vec<CatalogEntry> = specs
            .iter()
            .enumerate()
            .map(|(ordinal, spec)| CatalogEntry {
                soup_name: soup.to_string(),
                path: spec.path.clone(),
                column_name: column_name(soup, ordinal),
                column_type: spec.index_type,
            })
            .collect();
        let table = table_name(soup);

        in_transaction(&*self.store, || {
            self.store.execute(&create_table_sql(&table, &entries), &[])?;
            for entry in &entries {
                self.store.execute(
                    &format!(
                        "CREATE INDEX {} ON {} ({})",
                        index_name(&entry.column_name),
                        table,
                        quote_identifier(&entry.column_name)
                    ),
                    &[],
                )?;
            }
            self.catalog.insert_entries(&entries)
        })?;

        if let Some(cache) = &self.cache {
            let schema = SoupSchema::from_entries(soup, entries)?;
            cache.write().insert(soup.to_string(), Arc::new(schema));
        }
        info!(soup, indexes = specs.len(), "Registered soup");
        Ok(())
    }

    /// Drop a soup's table and catalog rows
    ///
    /// No-op if the soup does not exist.
    pub fn drop_soup(&self, soup: &str) -> Result<()> {
        let lock = self.soup_lock(soup);
        let _exclusive = lock.write();

        let Some(schema) = self.load(soup)? else {
            debug!(soup, "drop_soup: not registered");
            return Ok(());
        };

        in_transaction(&*self.store, || {
            self.store
                .execute(&format!("DROP TABLE IF EXISTS {}", schema.table), &[])?;
            self.catalog.delete_entries(soup)?;
            Ok(())
        })?;

        if let Some(cache) = &self.cache {
            cache.write().remove(soup);
        }
        info!(soup, "Dropped soup");
        Ok(())
    }

    /// Drop every registered soup
    pub fn drop_all_soups(&self) -> Result<()> {
        for soup in self.soup_names()? {
            self.drop_soup(&soup)?;
        }
        Ok(())
    }

    /// Delete every document of a soup, keeping its schema
    pub fn clear_soup(&self, soup: &str) -> Result<()> {
        let lock = self.soup_lock(soup);
        let _exclusive = lock.write();
        let schema = self.require(soup)?;
        let removed = SoupOps::new(&*self.store, &schema).clear()?;
        info!(soup, removed, "Cleared soup");
        Ok(())
    }

    /// Run `work` against a soup while holding its shared lock
    pub fn with_soup<T>(&self, soup: &str, work: impl FnOnce(SoupOps<'_>) -> Result<T>) -> Result<T> {
        let lock = self.soup_lock(soup);
        let _shared = lock.read();
        let schema = self.require(soup)?;
        work(SoupOps::new(&*self.store, &schema))
    }
}

fn create_table_sql(table: &str, entries: &[CatalogEntry]) -> String {
    let mut columns = vec![
        format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", ID_COL),
        format!("{} TEXT NOT NULL", SOUP_COL),
        format!("{} INTEGER NOT NULL", CREATED_COL),
        format!("{} INTEGER NOT NULL", LAST_MODIFIED_COL),
    ];
    columns.extend(entries.iter().map(|e| {
        format!(
            "{} {}",
            quote_identifier(&e.column_name),
            e.column_type.sql_type()
        )
    }));
    format!("CREATE TABLE {} ({})", table, columns.join(", "))
}
