//! Document Store Module
//!
//! The boundary to the hosted document database. The cache layer only needs
//! document get/set/update/delete, simple queries and an all-or-nothing batch
//! commit, so that is all the trait asks for.

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;

pub use memory::InMemoryStore;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// A buffered write, applied by [`DocumentStore::commit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WriteOp {
    /// Create or replace a document
    Set {
        collection: String,
        id: String,
        data: Value,
    },
    /// Merge fields into an existing document
    Update {
        collection: String,
        id: String,
        data: Value,
    },
    /// Remove a document
    Delete { collection: String, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Set { id, .. } | WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => id,
        }
    }
}

/// Hosted database client.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Shallow-merges the fields of `data` into an existing document.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Applies every operation or none of them.
    async fn commit(&self, ops: &[WriteOp]) -> Result<()>;
}
