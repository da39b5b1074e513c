//! RPC Module
//!
//! JSON-RPC access to the Solana cluster: transaction submission for the relay
//! queue and read-only asset lookups, both behind exponential-backoff retry.

mod client;
pub mod retry;

pub use client::RpcClient;
pub use retry::{with_retry, RetryConfig};
