//! Query Module
//!
//! Fluent builder for the simple equality/range queries the dashboard issues,
//! plus the cache-aside execution path in front of the document store.

mod builder;
mod filter;

pub use builder::{OrderBy, Query, QueryBuilder, MAX_COLLECTION_IN_KEY};
pub use filter::{Filter, FilterOp, SortDirection};
