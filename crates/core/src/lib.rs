//! Core types for SmartStore
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy
//! - SoupPath: parsed slash-delimited path into a JSON document
//! - project / build_projection: the document projector
//! - IndexSpec, IndexType: declared secondary indexes
//! - QuerySpec, QueryKind, Order: query value objects
//! - SqlValue: typed column values exchanged with the backing store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use json::{build_projection, project, PathParseError, SoupPath, PATH_SEPARATOR};
pub use types::{IndexSpec, IndexType, Order, QueryKind, QuerySpec, SoupEntryId};
pub use value::SqlValue;
