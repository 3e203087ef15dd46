//! Bond approval workflow.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use exotic_shared::types::Address;
use tracing::{debug, info};

use super::error::ApprovalError;
use super::gate::{Allowance, AllowanceGate};
use crate::ledger::Ledger;
use crate::notify::Notifier;
use crate::session::SessionContext;
use crate::transaction::{
    NotReadyReason, PendingTransaction, TransactionError, TransactionWorkflow, TxKind,
};

/// Lifecycle of a bond approval.
///
/// - Idle → Pending (approval submitted)
/// - Pending → Confirmed → Idle
/// - Pending → Failed → Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// Nothing in flight.
    Idle,
    /// Approval submitted, awaiting its receipt.
    Pending,
    /// The last approval confirmed.
    Confirmed,
    /// The last approval was rejected or reverted.
    Failed,
}

impl ApprovalState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approvals in flight, keyed by `(owner, spender)`.
///
/// Clones share the same table, so every flow that may approve the same
/// spender should be handed a clone of one instance.
#[derive(Debug, Clone, Default)]
pub struct ApprovalLocks {
    held: Arc<DashMap<(Address, Address), DateTime<Utc>>>,
}

impl ApprovalLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When the approval for `(owner, spender)` was started, if one is live.
    #[must_use]
    pub fn held_since(&self, owner: Address, spender: Address) -> Option<DateTime<Utc>> {
        self.held.get(&(owner, spender)).map(|since| *since)
    }

    /// Returns true if an approval for `(owner, spender)` is live.
    #[must_use]
    pub fn is_held(&self, owner: Address, spender: Address) -> bool {
        self.held.contains_key(&(owner, spender))
    }

    fn acquire(&self, owner: Address, spender: Address) -> Option<ApprovalLease> {
        match self.held.entry((owner, spender)) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Some(ApprovalLease {
                    locks: self.clone(),
                    key: (owner, spender),
                })
            }
        }
    }
}

/// Releases an approval lock when dropped.
struct ApprovalLease {
    locks: ApprovalLocks,
    key: (Address, Address),
}

impl Drop for ApprovalLease {
    fn drop(&mut self) {
        self.locks.held.remove(&self.key);
    }
}

/// Drives one approve transaction at a time and updates the gate.
pub struct ApprovalWorkflow {
    workflow: TransactionWorkflow,
    locks: ApprovalLocks,
    decimals: u32,
    last_outcome: Mutex<Option<ApprovalState>>,
    modal_open: Mutex<bool>,
}

impl ApprovalWorkflow {
    /// Creates an idle approval workflow.
    ///
    /// `locks` is the table shared by every flow that may approve the same
    /// spenders for the same owner.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, decimals: u32, locks: ApprovalLocks) -> Self {
        Self {
            workflow: TransactionWorkflow::new(TxKind::Approve, notifier),
            locks,
            decimals,
            last_outcome: Mutex::new(None),
            modal_open: Mutex::new(false),
        }
    }

    /// Current state: `Pending` while an approval is in flight.
    #[must_use]
    pub fn state(&self) -> ApprovalState {
        if self.workflow.is_busy() {
            ApprovalState::Pending
        } else {
            ApprovalState::Idle
        }
    }

    /// How the most recent approval ended.
    #[must_use]
    pub fn last_outcome(&self) -> Option<ApprovalState> {
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The approval currently in flight.
    #[must_use]
    pub fn pending(&self) -> Option<PendingTransaction> {
        self.workflow.pending()
    }

    /// Returns true while an approval is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.workflow.is_busy()
    }

    /// Shows the approval request modal.
    pub fn open_modal(&self) {
        self.set_modal(true);
    }

    /// Hides the approval request modal.
    pub fn close_modal(&self) {
        self.set_modal(false);
    }

    /// Returns true while the approval request modal is shown.
    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        *self.modal_open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_modal(&self, open: bool) {
        *self.modal_open.lock().unwrap_or_else(PoisonError::into_inner) = open;
    }

    fn finish(&self, outcome: ApprovalState) {
        debug!(from = %ApprovalState::Pending, to = %outcome, "approval settled");
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }

    /// Approves the gate's spender for exactly the gate's required amount.
    ///
    /// On confirmation the modal closes and the refreshed allowance is
    /// returned. The gate is refreshed after a failed approval too.
    /// The lock stays held until the approval settles, even if this future
    /// is dropped after broadcast.
    ///
    /// # Errors
    ///
    /// - `AlreadyPending` if an approval for the same owner and spender is
    ///   live, here or in any flow sharing the lock table.
    /// - `InvalidAmount` if the required amount cannot be expressed in base
    ///   units.
    /// - `Transaction` for a missing signer or a failed approval.
    pub async fn begin<L: Ledger>(
        &self,
        session: &SessionContext,
        ledger: &L,
        gate: &AllowanceGate,
    ) -> Result<Allowance, ApprovalError> {
        let Some(owner) = session.signer() else {
            return Err(TransactionError::NotReady {
                kind: TxKind::Approve,
                reason: NotReadyReason::NoSigner,
            }
            .into());
        };
        let spender = gate.spender();
        let required = gate.required();
        let amount = required.to_base_units(self.decimals)?;

        let already_pending = ApprovalError::AlreadyPending { owner, spender };
        if self.workflow.is_busy() {
            debug!(owner = %owner, spender = %spender, "approval refused: already pending");
            return Err(already_pending);
        }
        let Some(lease) = self.locks.acquire(owner, spender) else {
            debug!(owner = %owner, spender = %spender, "approval refused: locked by another flow");
            return Err(already_pending);
        };

        info!(owner = %owner, spender = %spender, amount = %required, "requesting approval");
        let result = self
            .workflow
            .submit_holding(
                session,
                lease,
                |signer| ledger.approve(signer, spender, amount),
                |_| Ok(()),
            )
            .await;

        match result {
            Ok(()) => {
                self.finish(ApprovalState::Confirmed);
                self.close_modal();
                Ok(gate.refresh(ledger, owner, spender, required).await)
            }
            Err(TransactionError::NotReady {
                reason: NotReadyReason::AlreadyPending,
                ..
            }) => Err(already_pending),
            Err(e) => {
                if !e.is_not_ready() {
                    self.finish(ApprovalState::Failed);
                    gate.refresh(ledger, owner, spender, required).await;
                }
                Err(e.into())
            }
        }
    }
}
