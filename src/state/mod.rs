//! State Sync Module
//!
//! Buffered state publication with coarse `stateSync` notifications.
//!
//! Updates published through [`StateManager::publish`] are held in a pending
//! set. The set is merged into the shared cache either by the periodic flush
//! task or immediately once it reaches the batch size. Every flush notifies all
//! registered listeners, whatever keys changed.

mod manager;
mod stream;

pub use manager::{
    Listener, PublishOutcome, StateEvent, StateManager, Subscription, SyncSettings, SyncStats,
    STATE_SYNC_EVENT,
};
pub use stream::StateEventStream;
