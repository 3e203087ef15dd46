//! Allowance gate.

use std::sync::{Mutex, MutexGuard, PoisonError};

use exotic_shared::types::{Address, TokenAmount};
use tracing::{debug, warn};

use crate::ledger::LedgerReader;

/// What a spender may move on an owner's behalf, against what it needs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowance {
    /// Owner of the funds; `None` while no wallet is connected.
    pub owner: Option<Address>,
    /// Contract that needs the authorization.
    pub spender: Address,
    /// Amount the next bond-moving action needs.
    pub required: TokenAmount,
    /// Last known allowance.
    pub current: TokenAmount,
}

impl Allowance {
    /// Returns true if the spender may move the required amount.
    #[must_use]
    pub fn authorized(&self) -> bool {
        self.current >= self.required
    }
}

/// Tracks whether the bonds contract may move the required bond.
///
/// The readiness flag is derived from the last successful read only; a
/// failed read leaves the previous snapshot in place.
#[derive(Debug)]
pub struct AllowanceGate {
    state: Mutex<Allowance>,
}

impl AllowanceGate {
    /// Creates a gate with an unknown (zero) current allowance.
    #[must_use]
    pub fn new(spender: Address, required: TokenAmount) -> Self {
        Self {
            state: Mutex::new(Allowance {
                owner: None,
                spender,
                required,
                current: TokenAmount::ZERO,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, Allowance> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Allowance {
        *self.state()
    }

    /// Returns true if the spender may move the required amount.
    #[must_use]
    pub fn authorized(&self) -> bool {
        self.state().authorized()
    }

    /// Amount the next bond-moving action needs.
    #[must_use]
    pub fn required(&self) -> TokenAmount {
        self.state().required
    }

    /// Contract that needs the authorization.
    #[must_use]
    pub fn spender(&self) -> Address {
        self.state().spender
    }

    /// Re-reads the allowance of `spender` over `owner`'s funds.
    ///
    /// On success the snapshot is replaced wholesale. A read failure is
    /// logged and the prior snapshot is kept.
    pub async fn refresh<R>(
        &self,
        reader: &R,
        owner: Address,
        spender: Address,
        required: TokenAmount,
    ) -> Allowance
    where
        R: LedgerReader + ?Sized,
    {
        match reader.allowance(owner, spender).await {
            Ok(current) => {
                let next = Allowance {
                    owner: Some(owner),
                    spender,
                    required,
                    current,
                };
                debug!(
                    owner = %owner,
                    spender = %spender,
                    current = %current,
                    required = %required,
                    authorized = next.authorized(),
                    "allowance refreshed"
                );
                *self.state() = next;
                next
            }
            Err(e) => {
                warn!(owner = %owner, spender = %spender, error = %e, "allowance read failed");
                self.snapshot()
            }
        }
    }

    /// Forgets the owner's allowance after the wallet disconnects.
    pub fn clear(&self) {
        let mut state = self.state();
        state.owner = None;
        state.current = TokenAmount::ZERO;
    }
}
