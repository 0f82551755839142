//! Atomic multi-document writes
//!
//! A batch applies its operations in order inside one transaction. The first
//! failing operation aborts the batch and rolls back everything before it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartstore_core::{Result, SoupEntryId};
use smartstore_storage::in_transaction;

use crate::ops::SoupOps;

/// One write in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BatchOp {
    /// Insert a new document
    Create {
        /// Document to insert
        doc: Value,
    },
    /// Replace the document stored under `id`
    Update {
        /// Target row
        id: SoupEntryId,
        /// New content
        doc: Value,
    },
    /// Create or update by the value at an indexed path
    Upsert {
        /// Document to write
        doc: Value,
        /// Indexed path holding the external id
        #[serde(rename = "externalIdPath")]
        external_id_path: String,
    },
    /// Remove the document stored under `id`
    Delete {
        /// Target row
        id: SoupEntryId,
    },
}

/// Outcome of one [`BatchOp`], in the same position as the op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum BatchResult {
    /// New document id
    Created {
        /// Assigned id
        id: SoupEntryId,
    },
    /// Whether a row was updated
    Updated {
        /// False when the id did not exist
        found: bool,
    },
    /// Id of the created or updated row
    Upserted {
        /// Written row
        id: SoupEntryId,
    },
    /// Delete applied (or nothing to delete)
    Deleted,
}

impl<'a> SoupOps<'a> {
    /// Apply `ops` atomically
    pub fn batch(&self, ops: &[BatchOp]) -> Result<Vec<BatchResult>> {
        in_transaction(self.store, || {
            ops.iter()
                .map(|op| match op {
                    BatchOp::Create { doc } => self.create(doc).map(|id| BatchResult::Created { id }),
                    BatchOp::Update { id, doc } => self
                        .update(*id, doc)
                        .map(|found| BatchResult::Updated { found }),
                    BatchOp::Upsert {
                        doc,
                        external_id_path,
                    } => self
                        .upsert(doc, external_id_path)
                        .map(|id| BatchResult::Upserted { id }),
                    BatchOp::Delete { id } => self.delete(*id).map(|()| BatchResult::Deleted),
                })
                .collect()
        })
    }
}
