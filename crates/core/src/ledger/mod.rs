//! Ledger access for the orchestration engine.
//!
//! The engine never talks to a chain directly. It consumes two interfaces:
//!
//! - [`LedgerReader`] - fallible async reads (allowance, balance, parameters)
//! - [`LedgerWriter`] - transaction submission returning a [`TxHandle`]
//!
//! A [`TxHandle`] resolves to a [`Receipt`] once the transaction is included.
//! [`InMemoryLedger`] implements both interfaces in-process for tests and
//! the simulator.

mod error;
mod memory;
mod traits;
mod types;

pub use error::LedgerError;
pub use memory::{FaultPlan, InMemoryLedger, MarketRecord, Submission};
pub use traits::{Ledger, LedgerReader, LedgerWriter};
pub use types::{
    ConfirmedVote, CreateMarketCall, LedgerEvent, MARKET_CREATED_EVENT, MarketCreatedEvent,
    MarketsParameters, Receipt, TxHandle, VoteCall,
};
