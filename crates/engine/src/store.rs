//! SmartStore: the caller-facing facade
//!
//! ## Opening
//!
//! - [`SmartStore::open`]: data directory with `smartstore.toml` and
//!   `smartstore.db`; a default config file is written on first open.
//! - [`SmartStore::open_with_config`]: same, but the given config is written
//!   to `smartstore.toml` so later opens pick it up.
//! - [`SmartStore::open_in_memory`]: private in-memory database.
//! - [`SmartStore::with_store`]: any [`RelationalStore`] implementation.
//!
//! Every document and query operation resolves the soup's schema, takes its
//! shared lock, and delegates to `SoupOps`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use smartstore_core::{IndexSpec, QuerySpec, Result, SoupEntryId};
use smartstore_storage::{JournalMode, RelationalStore, SqliteStore};
use tracing::info;

use crate::batch::{BatchOp, BatchResult};
use crate::config::{StoreConfig, CONFIG_FILE_NAME, DATABASE_FILE_NAME};
use crate::registry::SoupRegistry;

/// Embedded document store organized in soups
///
/// `Send + Sync`; share it through an `Arc`.
pub struct SmartStore {
    registry: SoupRegistry,
    config: StoreConfig,
    data_dir: Option<PathBuf>,
}

impl SmartStore {
    /// Open (or create) a store in `path`
    ///
    /// Reads `smartstore.toml`, writing the default one if it is missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        StoreConfig::write_default_if_missing(&config_path)?;
        let cfg = StoreConfig::from_file(&config_path)?;

        Self::open_dir(data_dir, cfg)
    }

    /// Open (or create) a store in `path` with an explicit config
    ///
    /// The config is persisted to `smartstore.toml`.
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: StoreConfig) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        cfg.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;
        Self::open_dir(data_dir, cfg)
    }

    fn open_dir(data_dir: PathBuf, cfg: StoreConfig) -> Result<Self> {
        let db_path = data_dir.join(DATABASE_FILE_NAME);
        let sqlite = SqliteStore::open(&db_path, cfg.sqlite_options())?;
        let mut store = Self::with_store(Arc::new(sqlite), cfg)?;
        info!(
            target: "smartstore::open",
            path = %db_path.display(),
            journal_mode = ?store.config.journal_mode,
            cache_catalog = store.config.cache_catalog,
            "Opened store"
        );
        store.data_dir = Some(data_dir);
        Ok(store)
    }

    /// Private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let sqlite = SqliteStore::open_in_memory()?;
        let cfg = StoreConfig {
            journal_mode: JournalMode::Memory,
            ..StoreConfig::default()
        };
        Self::with_store(Arc::new(sqlite), cfg)
    }

    /// Store on an existing backing store
    ///
    /// Only `cache_catalog` applies here; connection settings belong to
    /// whoever built `store`.
    pub fn with_store(store: Arc<dyn RelationalStore>, cfg: StoreConfig) -> Result<Self> {
        let registry = SoupRegistry::new(store, cfg.cache_catalog)?;
        Ok(SmartStore {
            registry,
            config: cfg,
            data_dir: None,
        })
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn RelationalStore> {
        self.registry.store()
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Data directory, `None` for in-memory and custom stores
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Register a soup with its index specs; no-op if it already exists
    pub fn register_soup(&self, soup: &str, specs: &[IndexSpec]) -> Result<()> {
        self.registry.register_soup(soup, specs)
    }

    /// Drop a soup and all of its documents; no-op if it does not exist
    pub fn drop_soup(&self, soup: &str) -> Result<()> {
        self.registry.drop_soup(soup)
    }

    /// Whether a soup is registered
    pub fn has_soup(&self, soup: &str) -> Result<bool> {
        self.registry.has_soup(soup)
    }

    /// Registered soup names, sorted
    pub fn soup_names(&self) -> Result<Vec<String>> {
        self.registry.soup_names()
    }

    /// Drop every soup
    pub fn drop_all_soups(&self) -> Result<()> {
        self.registry.drop_all_soups()
    }

    /// Remove every document of a soup, keeping the soup
    pub fn clear_soup(&self, soup: &str) -> Result<()> {
        self.registry.clear_soup(soup)
    }

    /// Index specs of a soup in declaration order
    pub fn index_specs(&self, soup: &str) -> Result<Vec<IndexSpec>> {
        self.registry.index_specs(soup)
    }

    /// Physical column name backing an indexed path
    pub fn column_name_for_path(&self, soup: &str, path: &str) -> Result<String> {
        self.registry.column_name_for_path(soup, path)
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Insert a document; returns its id
    pub fn create(&self, soup: &str, doc: &Value) -> Result<SoupEntryId> {
        self.registry.with_soup(soup, |ops| ops.create(doc))
    }

    /// Fetch a document by id
    pub fn retrieve(&self, soup: &str, id: SoupEntryId) -> Result<Option<Value>> {
        self.registry.with_soup(soup, |ops| ops.retrieve(id))
    }

    /// Fetch the documents that exist among `ids`, in id order
    pub fn retrieve_many(&self, soup: &str, ids: &[SoupEntryId]) -> Result<Vec<Value>> {
        self.registry.with_soup(soup, |ops| ops.retrieve_many(ids))
    }

    /// Replace the document under `id`; `false` if there is none
    pub fn update(&self, soup: &str, doc: &Value, id: SoupEntryId) -> Result<bool> {
        self.registry.with_soup(soup, |ops| ops.update(id, doc))
    }

    /// Create or update by the value at the indexed `external_id_path`
    pub fn upsert(&self, soup: &str, doc: &Value, external_id_path: &str) -> Result<SoupEntryId> {
        self.registry
            .with_soup(soup, |ops| ops.upsert(doc, external_id_path))
    }

    /// Delete the document under `id`; no-op if there is none
    pub fn delete(&self, soup: &str, id: SoupEntryId) -> Result<()> {
        self.registry.with_soup(soup, |ops| ops.delete(id))
    }

    /// Apply several writes atomically
    pub fn batch(&self, soup: &str, ops: &[BatchOp]) -> Result<Vec<BatchResult>> {
        self.registry.with_soup(soup, |soup_ops| soup_ops.batch(ops))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Run a query; returns whole documents or projection objects
    ///
    /// When `spec.page_size` is set, returns the first page.
    pub fn query_soup(&self, soup: &str, spec: &QuerySpec) -> Result<Vec<Value>> {
        self.registry.with_soup(soup, |ops| ops.query(spec))
    }

    /// Run a query and return page `page_index` (zero-based)
    ///
    /// # Errors
    ///
    /// `InvalidQuery` if `spec.page_size` is unset and `page_index` is not 0.
    pub fn query_soup_page(
        &self,
        soup: &str,
        spec: &QuerySpec,
        page_index: usize,
    ) -> Result<Vec<Value>> {
        self.registry
            .with_soup(soup, |ops| ops.query_page(spec, page_index))
    }

    /// Number of documents a query matches, ignoring paging
    pub fn count(&self, soup: &str, spec: &QuerySpec) -> Result<usize> {
        self.registry.with_soup(soup, |ops| ops.count(spec))
    }
}

impl std::fmt::Debug for SmartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartStore")
            .field("config", &self.config)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}
