//! Soup engine for SmartStore
//!
//! This crate turns the relational backing store into a document store:
//! - SoupRegistry: soup schemas (tables, index columns, catalog rows)
//! - CRUD: create, retrieve, update, upsert, delete by surrogate id
//! - Query: exact, range, like and full scans over one indexed path
//! - Batch: several writes in one transaction
//! - SmartStore: the facade callers use, with `smartstore.toml` config
//!
//! The engine is the only component that knows about:
//! - The catalog table and the column naming scheme
//! - Per-soup locking and the schema cache

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod catalog;
pub mod config;
mod crud;
pub mod naming;
pub mod ops;
pub mod query;
pub mod registry;
pub mod store;

pub use batch::{BatchOp, BatchResult};
pub use catalog::{CatalogEntry, IndexCatalog};
pub use config::{StoreConfig, CONFIG_FILE_NAME, DATABASE_FILE_NAME};
pub use ops::SoupOps;
pub use query::{compile, CompiledQuery};
pub use registry::{IndexColumn, SoupRegistry, SoupSchema};
pub use store::SmartStore;
