//! Allowance gate and bond approval.
//!
//! Bond-moving transactions are only offered once the bonds contract is
//! authorized to move the required amount. [`AllowanceGate`] tracks that
//! authorization; [`ApprovalWorkflow`] submits the approval that grants it.
//!
//! # Modules
//!
//! - `gate` - Allowance snapshot and its refresh from the ledger
//! - `approval` - Approval lifecycle and per-(owner, spender) locking
//! - `error` - Approval errors

mod approval;
mod error;
mod gate;

#[cfg(test)]
mod gate_props;

pub use approval::{ApprovalLocks, ApprovalState, ApprovalWorkflow};
pub use error::ApprovalError;
pub use gate::{Allowance, AllowanceGate};
