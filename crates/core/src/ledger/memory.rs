//! In-process ledger used by tests and the simulator.
//!
//! Mirrors the contract behavior the engine depends on: approvals set
//! allowances, market creation pulls the bond through the allowance and
//! emits `MarketCreated`, council votes are recorded per voter. State
//! changes are applied when the receipt resolves, not at submission.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exotic_shared::types::{Address, TokenAmount, TxHash};
use serde_json::json;
use tokio::sync::watch;

use super::error::LedgerError;
use super::traits::{LedgerReader, LedgerWriter};
use super::types::{
    ConfirmedVote, CreateMarketCall, LedgerEvent, MARKET_CREATED_EVENT, MarketsParameters,
    Receipt, TxHandle, VoteCall,
};

/// Address of the bonds contract in the in-memory ledger.
const BONDS_CONTRACT: Address = Address::from_low_byte(0xb0);

/// Faults to inject into subsequent ledger calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Submissions fail before broadcast (wallet rejection).
    pub reject_submissions: bool,
    /// Receipts report a reverted execution.
    pub revert_receipts: bool,
    /// Every read fails.
    pub fail_reads: bool,
    /// Successful receipts carry no events.
    pub omit_events: bool,
}

/// A transaction the ledger has accepted for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// `approve(spender, amount)`.
    Approve {
        /// Signing account.
        signer: Address,
        /// Approved spender.
        spender: Address,
        /// Amount in base units.
        amount: u128,
    },
    /// `createExoticMarket(...)`.
    CreateMarket {
        /// Signing account.
        signer: Address,
        /// Call arguments.
        call: CreateMarketCall,
    },
    /// `voteForDispute(...)`.
    Vote {
        /// Signing account.
        signer: Address,
        /// Call arguments.
        call: VoteCall,
    },
}

/// A market created on the in-memory ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRecord {
    /// Market contract address.
    pub address: Address,
    /// Creator.
    pub owner: Address,
    /// Creation arguments.
    pub call: CreateMarketCall,
}

#[derive(Debug)]
struct State {
    params: MarketsParameters,
    decimals: u32,
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    council: HashSet<Address>,
    votes: HashMap<(Address, u64, Address), ConfirmedVote>,
    markets: Vec<MarketRecord>,
    submissions: Vec<Submission>,
    faults: FaultPlan,
    tx_counter: u64,
}

impl State {
    fn next_hash(&mut self) -> TxHash {
        self.tx_counter += 1;
        TxHash(format!("0x{:064x}", self.tx_counter))
    }

    fn next_market_address(&self) -> Address {
        let mut bytes = [0xee; 20];
        let n = (self.markets.len() + 1).to_be_bytes();
        bytes[20 - n.len()..].copy_from_slice(&n);
        Address::from_bytes(bytes)
    }
}

/// Deterministic in-process ledger implementing both ledger interfaces.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<State>>,
    release: Arc<watch::Sender<bool>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger with the given parameters.
    #[must_use]
    pub fn new(params: MarketsParameters, decimals: u32) -> Self {
        let (release, _) = watch::channel(true);
        Self {
            state: Arc::new(Mutex::new(State {
                params,
                decimals,
                balances: HashMap::new(),
                allowances: HashMap::new(),
                council: HashSet::new(),
                votes: HashMap::new(),
                markets: Vec::new(),
                submissions: Vec::new(),
                faults: FaultPlan::default(),
                tx_counter: 0,
            })),
            release: Arc::new(release),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Sets the balance of `owner`.
    pub fn set_balance(&self, owner: Address, amount: TokenAmount) {
        self.state().balances.insert(owner, amount);
    }

    /// Sets the allowance of `spender` over `owner`'s funds.
    pub fn set_allowance(&self, owner: Address, spender: Address, amount: TokenAmount) {
        self.state().allowances.insert((owner, spender), amount);
    }

    /// Adds `account` to the oracle council.
    pub fn add_council_member(&self, account: Address) {
        self.state().council.insert(account);
    }

    /// Replaces the fault plan.
    pub fn set_faults(&self, faults: FaultPlan) {
        self.state().faults = faults;
    }

    /// Keeps receipts pending until [`Self::release_receipts`] is called.
    pub fn hold_receipts(&self) {
        self.release.send_replace(false);
    }

    /// Lets held and future receipts resolve.
    pub fn release_receipts(&self) {
        self.release.send_replace(true);
    }

    /// Transactions accepted so far, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// Markets created so far.
    #[must_use]
    pub fn markets(&self) -> Vec<MarketRecord> {
        self.state().markets.clone()
    }

    /// Current balance of `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: Address) -> TokenAmount {
        self.state()
            .balances
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    /// Current allowance of `spender` over `owner`'s funds.
    #[must_use]
    pub fn allowance_of(&self, owner: Address, spender: Address) -> TokenAmount {
        self.state()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn check_read(&self) -> Result<(), LedgerError> {
        if self.state().faults.fail_reads {
            return Err(LedgerError::read("provider unavailable"));
        }
        Ok(())
    }

    /// Records a submission and builds a handle whose receipt applies
    /// `effect` once released.
    fn submit<E>(&self, submission: Submission, effect: E) -> Result<TxHandle, LedgerError>
    where
        E: FnOnce(&mut State) -> Result<Vec<LedgerEvent>, LedgerError> + Send + 'static,
    {
        let (hash, faults) = {
            let mut state = self.state();
            if state.faults.reject_submissions {
                return Err(LedgerError::rejected("user denied transaction signature"));
            }
            state.submissions.push(submission);
            (state.next_hash(), state.faults)
        };

        let state = Arc::clone(&self.state);
        let mut release = self.release.subscribe();
        let receipt_hash = hash.clone();

        Ok(TxHandle::new(hash, async move {
            // Sender lives as long as the ledger; a closed channel releases.
            let _ = release.wait_for(|open| *open).await;

            let mut state = lock(&state);
            let reverted = || Receipt {
                transaction_hash: Some(receipt_hash.clone()),
                reverted: true,
                events: Vec::new(),
            };
            if faults.revert_receipts {
                return Ok(reverted());
            }
            match effect(&mut state) {
                Ok(events) => Ok(Receipt {
                    transaction_hash: Some(receipt_hash.clone()),
                    reverted: false,
                    events: if faults.omit_events { Vec::new() } else { events },
                }),
                Err(LedgerError::Reverted(reason)) => {
                    tracing::debug!(%reason, "in-memory transaction reverted");
                    Ok(reverted())
                }
                Err(e) => Err(e),
            }
        }))
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LedgerReader for InMemoryLedger {
    async fn allowance(&self, owner: Address, spender: Address) -> Result<TokenAmount, LedgerError> {
        self.check_read()?;
        Ok(self.allowance_of(owner, spender))
    }

    async fn balance(&self, owner: Address) -> Result<TokenAmount, LedgerError> {
        self.check_read()?;
        Ok(self.balance_of(owner))
    }

    async fn markets_parameters(&self) -> Result<MarketsParameters, LedgerError> {
        self.check_read()?;
        Ok(self.state().params.clone())
    }

    async fn is_oracle_council_member(&self, account: Address) -> Result<bool, LedgerError> {
        self.check_read()?;
        Ok(self.state().council.contains(&account))
    }

    async fn dispute_vote(
        &self,
        market: Address,
        dispute_number: u64,
        voter: Address,
    ) -> Result<ConfirmedVote, LedgerError> {
        self.check_read()?;
        Ok(self
            .state()
            .votes
            .get(&(market, dispute_number, voter))
            .copied()
            .unwrap_or(ConfirmedVote::NONE))
    }
}

impl LedgerWriter for InMemoryLedger {
    fn bonds_spender(&self) -> Address {
        BONDS_CONTRACT
    }

    async fn approve(
        &self,
        signer: Address,
        spender: Address,
        amount: u128,
    ) -> Result<TxHandle, LedgerError> {
        self.submit(
            Submission::Approve {
                signer,
                spender,
                amount,
            },
            move |state| {
                let approved = TokenAmount::from_base_units(amount, state.decimals)
                    .ok_or_else(|| LedgerError::reverted("approval amount out of range"))?;
                state.allowances.insert((signer, spender), approved);
                Ok(vec![LedgerEvent::new(
                    "Approval",
                    json!({
                        "owner": signer.to_string(),
                        "spender": spender.to_string(),
                        "value": amount.to_string(),
                    }),
                )])
            },
        )
    }

    async fn create_market(
        &self,
        signer: Address,
        call: CreateMarketCall,
    ) -> Result<TxHandle, LedgerError> {
        let submitted = call.clone();
        self.submit(
            Submission::CreateMarket {
                signer,
                call: submitted,
            },
            move |state| {
                let bond = state.params.fixed_bond_amount;
                let allowance = state
                    .allowances
                    .get(&(signer, BONDS_CONTRACT))
                    .copied()
                    .unwrap_or_default();
                let balance = state.balances.get(&signer).copied().unwrap_or_default();
                if allowance < bond {
                    return Err(LedgerError::reverted("bond allowance too low"));
                }
                if balance < bond {
                    return Err(LedgerError::reverted("bond exceeds balance"));
                }
                if call.positions.len() != call.position_count || call.position_count < 2 {
                    return Err(LedgerError::reverted("invalid positions"));
                }

                state
                    .allowances
                    .insert((signer, BONDS_CONTRACT), TokenAmount::new(allowance.0 - bond.0));
                state
                    .balances
                    .insert(signer, TokenAmount::new(balance.0 - bond.0));

                let address = state.next_market_address();
                let question = call.question.clone();
                state.markets.push(MarketRecord {
                    address,
                    owner: signer,
                    call,
                });

                Ok(vec![
                    LedgerEvent::new(
                        "Transfer",
                        json!({
                            "from": signer.to_string(),
                            "to": BONDS_CONTRACT.to_string(),
                            "value": bond.to_string(),
                        }),
                    ),
                    LedgerEvent::new(
                        MARKET_CREATED_EVENT,
                        json!({
                            "marketAddress": address.to_string(),
                            "marketQuestion": question,
                            "marketOwner": signer.to_string(),
                        }),
                    ),
                ])
            },
        )
    }

    async fn vote_for_dispute(&self, signer: Address, call: VoteCall) -> Result<TxHandle, LedgerError> {
        self.submit(Submission::Vote { signer, call }, move |state| {
            if !state.council.contains(&signer) {
                return Err(LedgerError::reverted("not an oracle council member"));
            }
            state.votes.insert(
                (call.market, call.dispute_number, signer),
                ConfirmedVote {
                    vote: call.vote,
                    position: call.position,
                },
            );
            Ok(vec![LedgerEvent::new(
                "VotedAddedForDispute",
                json!({
                    "market": call.market.to_string(),
                    "disputeIndex": call.dispute_number,
                    "disputeCodeVote": call.vote,
                    "winningPosition": call.position,
                    "voter": signer.to_string(),
                }),
            )])
        })
    }
}
