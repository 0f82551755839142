//! Soup Integration Tests
//!
//! End-to-end tests through the `SmartStore` facade: schema lifecycle,
//! document CRUD, queries, batches and persistence across reopen.

#[path = "../common/mod.rs"]
mod common;

mod batch;
mod documents;
mod persistence;
mod queries;
