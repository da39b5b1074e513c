//! Transaction Queue Module
//!
//! Priority queue of transactions waiting to be relayed to the chain, and the
//! single-step relay routine polled by the background relay task.

mod queue;
mod relay;

pub use queue::{QueuedTransaction, TransactionQueue};
pub use relay::{process_next, RelayOutcome, TransactionRelay};
