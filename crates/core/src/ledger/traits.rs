//! Ledger read and write interfaces.

use std::future::Future;

use exotic_shared::types::{Address, TokenAmount};

use super::error::LedgerError;
use super::types::{ConfirmedVote, CreateMarketCall, MarketsParameters, TxHandle, VoteCall};

/// Fallible async reads of ledger state.
///
/// Callers treat every failure as "unknown": they log it and keep the last
/// known value.
pub trait LedgerReader: Send + Sync {
    /// Amount `spender` may move on behalf of `owner`.
    fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<TokenAmount, LedgerError>> + Send;

    /// Payment-currency balance of `owner`.
    fn balance(&self, owner: Address)
    -> impl Future<Output = Result<TokenAmount, LedgerError>> + Send;

    /// Current market creation parameters.
    fn markets_parameters(
        &self,
    ) -> impl Future<Output = Result<MarketsParameters, LedgerError>> + Send;

    /// Whether `account` sits on the oracle council.
    fn is_oracle_council_member(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// The vote `voter` has recorded for a dispute.
    fn dispute_vote(
        &self,
        market: Address,
        dispute_number: u64,
        voter: Address,
    ) -> impl Future<Output = Result<ConfirmedVote, LedgerError>> + Send;
}

/// Transaction submission.
///
/// Each call resolves once the transaction has been handed to the network
/// and returns a handle to await its receipt. Rejections before broadcast
/// are returned as [`LedgerError::Rejected`].
pub trait LedgerWriter: Send + Sync {
    /// The contract that holds market bonds and must be approved as spender.
    fn bonds_spender(&self) -> Address;

    /// Approves `spender` to move `amount` base units for `signer`.
    fn approve(
        &self,
        signer: Address,
        spender: Address,
        amount: u128,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send;

    /// Creates a market.
    fn create_market(
        &self,
        signer: Address,
        call: CreateMarketCall,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send;

    /// Casts or changes a council vote on a dispute.
    fn vote_for_dispute(
        &self,
        signer: Address,
        call: VoteCall,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send;
}

/// A ledger that can be both read and written.
pub trait Ledger: LedgerReader + LedgerWriter {}

impl<T: LedgerReader + LedgerWriter> Ledger for T {}
