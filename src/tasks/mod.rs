//! Background Tasks Module
//!
//! Contains background tasks that run periodically during sidecar operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - State Flush: Pushes buffered state updates into the cache each tick
//! - Transaction Relay: Submits one queued transaction per tick

mod cleanup;
mod flush;
mod relay;

pub use cleanup::spawn_cleanup_task;
pub use flush::spawn_flush_task;
pub use relay::spawn_relay_task;
