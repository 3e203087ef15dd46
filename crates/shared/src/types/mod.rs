//! Common types used across the application.

pub mod address;
pub mod amount;
pub mod id;

pub use address::{Address, AddressError, TxHash};
pub use amount::{AmountError, TokenAmount};
pub use id::*;
