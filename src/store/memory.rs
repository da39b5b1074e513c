//! In-process document store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Result, SyncError};
use crate::query::Query;
use crate::store::{Document, DocumentStore, WriteOp};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Document store held entirely in memory. Stands in for the hosted database
/// when the sidecar runs without one.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn apply(collections: &mut Collections, op: &WriteOp) -> Result<()> {
    match op {
        WriteOp::Set {
            collection,
            id,
            data,
        } => {
            collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), data.clone());
            Ok(())
        }
        WriteOp::Update {
            collection,
            id,
            data,
        } => {
            let Value::Object(fields) = data else {
                return Err(SyncError::InvalidRequest(
                    "update data must be an object".to_string(),
                ));
            };
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| SyncError::NotFound(format!("{}/{}", collection, id)))?;

            match existing {
                Value::Object(target) => {
                    for (field, value) in fields {
                        target.insert(field.clone(), value.clone());
                    }
                }
                other => *other = data.clone(),
            }
            Ok(())
        }
        WriteOp::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let op = WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        };
        apply(&mut *self.collections.write().await, &op)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let op = WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        };
        apply(&mut *self.collections.write().await, &op)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let op = WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        apply(&mut *self.collections.write().await, &op)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(&query.collection)
            .into_iter()
            .flat_map(|docs| docs.iter())
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            });
        Ok(query.apply(docs))
    }

    async fn commit(&self, ops: &[WriteOp]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let mut staged = collections.clone();
        for op in ops {
            apply(&mut staged, op)?;
        }
        *collections = staged;
        Ok(())
    }
}
