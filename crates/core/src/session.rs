//! Wallet session context.
//!
//! The connected account, provider readiness and chain are passed to every
//! workflow call instead of being read from ambient global state.

use exotic_shared::types::Address;

/// Snapshot of the wallet connection a flow acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    /// Connected account, if any.
    pub account: Option<Address>,
    /// Chain the provider is connected to.
    pub chain_id: u64,
    /// Whether the provider has been initialized.
    pub provider_ready: bool,
}

impl SessionContext {
    /// A session with a connected, ready signer.
    #[must_use]
    pub const fn connected(account: Address, chain_id: u64) -> Self {
        Self {
            account: Some(account),
            chain_id,
            provider_ready: true,
        }
    }

    /// A session with no wallet connected.
    #[must_use]
    pub const fn disconnected(chain_id: u64) -> Self {
        Self {
            account: None,
            chain_id,
            provider_ready: false,
        }
    }

    /// The account able to sign transactions.
    ///
    /// `None` unless an account is connected AND the provider is ready.
    #[must_use]
    pub fn signer(&self) -> Option<Address> {
        self.account.filter(|_| self.provider_ready)
    }

    /// Returns true if a signer is available.
    #[must_use]
    pub fn is_wallet_connected(&self) -> bool {
        self.signer().is_some()
    }
}
