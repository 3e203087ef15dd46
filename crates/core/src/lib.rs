//! Transaction orchestration and dispute voting engine for Exotic Markets.
//!
//! This crate contains the logic between the wallet and the UI with ZERO
//! rendering or wallet-connection dependencies. Ledger access, notifications
//! and navigation are traits implemented by collaborators.
//!
//! # Modules
//!
//! - `session` - Explicitly passed wallet/provider session context
//! - `rules` - Ordered `(predicate, outcome)` rule evaluation
//! - `ledger` - Ledger read/write interfaces, receipts and an in-memory ledger
//! - `notify` - Notification and navigation interfaces
//! - `transaction` - Generic submit/await/react transaction workflow
//! - `allowance` - Allowance gate and approval workflow
//! - `market` - Market draft validation and the market creation flow
//! - `dispute` - Dispute voting state machine

pub mod allowance;
pub mod dispute;
pub mod ledger;
pub mod market;
pub mod notify;
pub mod rules;
pub mod session;
pub mod transaction;

pub use session::SessionContext;
