//! Generic submit/await/react transaction workflow.
//!
//! Every ledger write in the engine goes through a [`TransactionWorkflow`].
//! One workflow instance serves one call site and runs at most one
//! transaction at a time; submissions while busy are refused, not queued.
//!
//! # Modules
//!
//! - `types` - Transaction kinds, statuses and the pending-transaction record
//! - `error` - Transaction error taxonomy
//! - `workflow` - The workflow itself

pub mod error;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod workflow_props;

pub use error::{NotReadyReason, TransactionError};
pub use types::{PendingTransaction, TxKind, TxStatus};
pub use workflow::TransactionWorkflow;
