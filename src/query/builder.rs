//! Query builder and cached execution.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CacheManager, Domain};
use crate::error::Result;
use crate::query::filter::{compare, lookup, Filter, FilterOp, SortDirection};
use crate::store::{Document, DocumentStore};

/// Longest collection name embedded verbatim in a query cache key.
pub const MAX_COLLECTION_IN_KEY: usize = 64;

fn hash_of(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Sort clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

// == Query ==
/// A built query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Query {
    /// Whether a document body satisfies every filter.
    pub fn matches(&self, data: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(data))
    }

    /// Filters, sorts and truncates `docs`. Documents missing the sort field
    /// sort after all others.
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(&d.data)).collect();

        if let Some(order) = &self.order_by {
            out.sort_by(|a, b| {
                let left = lookup(&a.data, &order.field);
                let right = lookup(&b.data, &order.field);
                match (left, right) {
                    (Some(l), Some(r)) => {
                        let ord = compare(l, r).unwrap_or(Ordering::Equal);
                        match order.direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    /// Stable cache key: `query:<collection>:<hash of the serialized query>`.
    ///
    /// Collection names longer than [`MAX_COLLECTION_IN_KEY`] bytes are replaced
    /// by their own hash so the key always fits the cache's key limit.
    pub fn cache_key(&self) -> String {
        let query_hash = hash_of(&serde_json::to_string(self).unwrap_or_default());
        let collection = if self.collection.len() <= MAX_COLLECTION_IN_KEY {
            self.collection.clone()
        } else {
            format!("{:016x}", hash_of(&self.collection))
        };
        Domain::Query.key(&format!("{}:{:016x}", collection, query_hash))
    }

    /// Runs the query through the cache, hitting `store` only on a miss.
    pub async fn fetch(
        &self,
        store: &dyn DocumentStore,
        cache: &CacheManager,
        ttl_ms: Option<u64>,
    ) -> Result<Vec<Document>> {
        let cached = cache
            .get_or_fetch(&self.cache_key(), ttl_ms, || async {
                let docs = store.query(self).await?;
                Ok(Some(serde_json::to_value(docs)?))
            })
            .await?;

        match cached {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }
}

// == Query Builder ==
/// Accumulates clauses for a [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            query: Query {
                collection: collection.into(),
                filters: Vec::new(),
                order_by: None,
                limit: None,
            },
        }
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(field, FilterOp::Eq, value)
    }

    pub fn where_op(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.query.filters.push(Filter::new(field, op, value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }

    /// Builds and runs the query through the cache.
    pub async fn fetch(
        self,
        store: &dyn DocumentStore,
        cache: &CacheManager,
        ttl_ms: Option<u64>,
    ) -> Result<Vec<Document>> {
        self.build().fetch(store, cache, ttl_ms).await
    }
}
