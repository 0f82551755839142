//! SmartStore - embedded indexed document store
//!
//! SmartStore keeps schemaless JSON documents in named *soups*. Each soup
//! declares a set of index paths when it is registered; documents can then be
//! queried by exact match, range or LIKE pattern on any indexed path.
//!
//! # Quick Start
//!
//! ```ignore
//! use smartstore::{IndexSpec, Order, QuerySpec, SmartStore};
//! use serde_json::json;
//!
//! let store = SmartStore::open_in_memory()?;
//! store.register_soup("people", &[IndexSpec::text("name"), IndexSpec::integer("age")])?;
//!
//! store.create("people", &json!({"name": "Ann", "age": 30}))?;
//! let adults = store.query_soup(
//!     "people",
//!     &QuerySpec::range("age", json!(18), json!(99), Order::Ascending),
//! )?;
//! ```
//!
//! # Architecture
//!
//! - `smartstore-core`: errors, paths and projection, query value objects
//! - `smartstore-storage`: the `RelationalStore` contract and its SQLite
//!   implementation
//! - `smartstore-engine`: soup registry, CRUD, query, batch and the
//!   [`SmartStore`] facade

pub use smartstore_core::{
    build_projection, project, Error, IndexSpec, IndexType, Order, PathParseError, QueryKind,
    QuerySpec, Result, SoupEntryId, SoupPath, SqlValue,
};
pub use smartstore_engine::{BatchOp, BatchResult, SmartStore, StoreConfig};
pub use smartstore_storage::{JournalMode, RelationalStore, SqliteStore};
