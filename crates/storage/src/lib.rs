//! Relational backing store for SmartStore
//!
//! This crate implements the storage layer the soup engine runs on:
//! - RelationalStore: transactional SQL contract (execute, query, insert,
//!   update, delete, nested transactions, table introspection)
//! - SqliteStore: rusqlite implementation on one shared connection
//! - testing: fault injection for rollback tests
//!
//! Encryption at rest, if any, is a property of the SQLite build linked in;
//! this crate does not manage keys.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sqlite;
pub mod testing;
pub mod traits;

pub use sqlite::{JournalMode, SqliteOptions, SqliteStore};
pub use traits::{in_transaction, RelationalStore, Row, Select};
