//! Market creation flow: submit action resolution and submission.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use exotic_shared::types::{Address, TokenAmount};
use tracing::{debug, info, warn};

use super::draft::MarketDraft;
use super::error::CreateMarketError;
use super::types::MissingField;
use super::validation::{FieldStatus, insufficient_balance};
use crate::allowance::{Allowance, AllowanceGate, ApprovalError, ApprovalLocks, ApprovalWorkflow};
use crate::ledger::{Ledger, LedgerReader, MarketsParameters};
use crate::notify::{Navigator, Notifier};
use crate::rules::{Rule, first_match};
use crate::session::SessionContext;
use crate::transaction::{NotReadyReason, TransactionError, TransactionWorkflow, TxKind};

/// What the create-market button offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMarketAction {
    /// No wallet connected; the button starts the connection.
    ConnectWallet,
    /// Balance cannot cover the bond.
    InsufficientBalance,
    /// A field still needs input.
    MissingField(MissingField),
    /// The bond allowance must be approved first.
    Approve {
        /// An approval is in flight.
        in_progress: bool,
    },
    /// Everything is in place.
    CreateMarket {
        /// A creation is in flight.
        in_progress: bool,
    },
}

impl CreateMarketAction {
    /// Translation key of the button label.
    #[must_use]
    pub const fn label_key(&self) -> &'static str {
        match self {
            Self::ConnectWallet => "common.wallet.connect-your-wallet",
            Self::InsufficientBalance => "common.errors.insufficient-balance",
            Self::MissingField(field) => field.label_key(),
            Self::Approve { in_progress: false } => "common.enable-wallet-access.approve-label",
            Self::Approve { in_progress: true } => {
                "common.enable-wallet-access.approve-progress-label"
            }
            Self::CreateMarket { in_progress: false } => {
                "market.create-market.button.create-market-label"
            }
            Self::CreateMarket { in_progress: true } => {
                "market.create-market.button.create-market-progress-label"
            }
        }
    }

    /// Returns true if the button can be pressed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        match self {
            Self::ConnectWallet => true,
            Self::InsufficientBalance | Self::MissingField(_) => false,
            Self::Approve { in_progress } | Self::CreateMarket { in_progress } => !*in_progress,
        }
    }
}

/// Inputs of the submit action ladder.
#[derive(Debug, Clone, Copy)]
struct ActionContext {
    wallet_connected: bool,
    insufficient_balance: bool,
    missing: Option<MissingField>,
    authorized: bool,
    approving: bool,
    submitting: bool,
}

const ACTION_RULES: [Rule<ActionContext, CreateMarketAction>; 5] = [
    Rule::new(
        "connect-wallet",
        |c| !c.wallet_connected,
        |_| CreateMarketAction::ConnectWallet,
    ),
    Rule::new(
        "insufficient-balance",
        |c| c.insufficient_balance,
        |_| CreateMarketAction::InsufficientBalance,
    ),
    Rule::new("missing-field", |c| c.missing.is_some(), missing_field),
    Rule::new(
        "approve",
        |c| !c.authorized,
        |c| CreateMarketAction::Approve {
            in_progress: c.approving,
        },
    ),
    Rule::new(
        "create-market",
        |_| true,
        |c| CreateMarketAction::CreateMarket {
            in_progress: c.submitting,
        },
    ),
];

fn missing_field(ctx: &ActionContext) -> CreateMarketAction {
    // Only reached when `missing` is set.
    CreateMarketAction::MissingField(ctx.missing.unwrap_or(MissingField::Question))
}

/// One open create-market form.
///
/// Owns the draft, the bond allowance gate, the approval workflow and the
/// creation workflow. Balance and allowance are refreshed from the ledger
/// on demand; the last successful read is kept when a read fails.
pub struct MarketCreationFlow {
    params: MarketsParameters,
    decimals: u32,
    draft: Mutex<MarketDraft>,
    balance: Mutex<Option<TokenAmount>>,
    gate: AllowanceGate,
    approval: ApprovalWorkflow,
    workflow: TransactionWorkflow,
    navigator: Arc<dyn Navigator>,
}

impl MarketCreationFlow {
    /// Creates a flow with an empty draft.
    ///
    /// `spender` is the bonds contract the allowance is checked against.
    /// `locks` is shared by every flow approving that spender, so only one
    /// approval per owner is pending at a time.
    #[must_use]
    pub fn new(
        params: MarketsParameters,
        spender: Address,
        decimals: u32,
        locks: ApprovalLocks,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let draft = MarketDraft::new(&params, Utc::now(), Vec::new());
        Self {
            gate: AllowanceGate::new(spender, params.fixed_bond_amount),
            approval: ApprovalWorkflow::new(Arc::clone(&notifier), decimals, locks),
            workflow: TransactionWorkflow::new(TxKind::CreateMarket, notifier),
            draft: Mutex::new(draft),
            balance: Mutex::new(None),
            params,
            decimals,
            navigator,
        }
    }

    /// Replaces the draft.
    #[must_use]
    pub fn with_draft(self, draft: MarketDraft) -> Self {
        *lock(&self.draft) = draft;
        self
    }

    /// Snapshot of the draft.
    #[must_use]
    pub fn draft(&self) -> MarketDraft {
        lock(&self.draft).clone()
    }

    /// Applies an edit to the draft.
    pub fn edit<R>(&self, edit: impl FnOnce(&mut MarketDraft) -> R) -> R {
        edit(&mut lock(&self.draft))
    }

    /// Bond the creator must deposit.
    #[must_use]
    pub fn bond(&self) -> TokenAmount {
        self.params.fixed_bond_amount
    }

    /// Last known balance, `None` until a read succeeds.
    #[must_use]
    pub fn balance(&self) -> Option<TokenAmount> {
        *lock(&self.balance)
    }

    /// Allowance gate of the bonds contract.
    #[must_use]
    pub fn gate(&self) -> &AllowanceGate {
        &self.gate
    }

    /// Approval workflow for the bond.
    #[must_use]
    pub fn approval(&self) -> &ApprovalWorkflow {
        &self.approval
    }

    /// Returns true while a market creation is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.workflow.is_busy()
    }

    /// Field predicates of the current draft.
    #[must_use]
    pub fn field_status(&self) -> FieldStatus {
        FieldStatus::of(&lock(&self.draft))
    }

    /// Returns true if the known balance cannot cover the bond.
    ///
    /// An unknown balance counts as zero.
    #[must_use]
    pub fn insufficient_balance(&self) -> bool {
        insufficient_balance(self.balance().unwrap_or(TokenAmount::ZERO), self.bond())
    }

    /// Resolves the create-market button for `session`.
    #[must_use]
    pub fn action(&self, session: &SessionContext) -> CreateMarketAction {
        let ctx = ActionContext {
            wallet_connected: session.is_wallet_connected(),
            insufficient_balance: self.insufficient_balance(),
            missing: self.field_status().first_missing(),
            authorized: self.gate.authorized(),
            approving: self.approval.is_busy(),
            submitting: self.workflow.is_busy(),
        };
        first_match(&ctx, &ACTION_RULES).unwrap_or(CreateMarketAction::CreateMarket {
            in_progress: ctx.submitting,
        })
    }

    /// Re-reads balance and allowance for the session's account.
    ///
    /// Without a signer both are forgotten. Read failures keep the last
    /// known values.
    pub async fn refresh<R: LedgerReader>(&self, reader: &R, session: &SessionContext) {
        let Some(owner) = session.signer() else {
            *lock(&self.balance) = None;
            self.gate.clear();
            return;
        };

        match reader.balance(owner).await {
            Ok(balance) => {
                debug!(owner = %owner, balance = %balance, "balance refreshed");
                *lock(&self.balance) = Some(balance);
            }
            Err(e) => warn!(owner = %owner, error = %e, "balance read failed"),
        }
        self.gate
            .refresh(reader, owner, self.gate.spender(), self.bond())
            .await;
    }

    /// Opens the approval request modal.
    pub fn request_approval(&self) {
        self.approval.open_modal();
    }

    /// Approves the bonds contract for exactly the bond amount.
    pub async fn approve<L: Ledger>(
        &self,
        session: &SessionContext,
        ledger: &L,
    ) -> Result<Allowance, ApprovalError> {
        self.approval.begin(session, ledger, &self.gate).await
    }

    /// Submits the draft and navigates to the new market.
    ///
    /// Returns the new market's address.
    ///
    /// # Errors
    ///
    /// - `Transaction(NotReady)` without a signer or while a creation is in
    ///   flight. Nothing is submitted and nothing is shown.
    /// - `Blocked` while the button offers anything other than "create
    ///   market".
    /// - `Transaction(MalformedReceipt)` if the creation confirmed but its
    ///   last event does not name a market. No navigation happens.
    pub async fn submit<L: Ledger>(
        &self,
        session: &SessionContext,
        ledger: &L,
    ) -> Result<Address, CreateMarketError> {
        let not_ready = |reason| TransactionError::NotReady {
            kind: TxKind::CreateMarket,
            reason,
        };
        match self.action(session) {
            CreateMarketAction::CreateMarket { in_progress: false } => {}
            CreateMarketAction::CreateMarket { in_progress: true } => {
                debug!("create market refused: already pending");
                return Err(not_ready(NotReadyReason::AlreadyPending).into());
            }
            CreateMarketAction::ConnectWallet => {
                debug!("create market refused: no signer");
                return Err(not_ready(NotReadyReason::NoSigner).into());
            }
            blocked => {
                debug!(action = blocked.label_key(), "create market blocked");
                return Err(CreateMarketError::Blocked(blocked));
            }
        }

        let call = lock(&self.draft).to_call(self.decimals)?;
        info!(
            question = %call.question,
            positions = call.position_count,
            tags = call.tags.len(),
            ticket_price = call.ticket_price,
            "creating market"
        );

        let market = self
            .workflow
            .submit(
                session,
                |signer| ledger.create_market(signer, call),
                |receipt| {
                    receipt
                        .market_created()
                        .map(|event| event.market_address)
                        .map_err(|e| TransactionError::MalformedReceipt(e.to_string()))
                },
            )
            .await?;

        info!(market = %market, "market created");
        self.navigator.navigate_to_market(market);
        self.refresh(ledger, session).await;
        Ok(market)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
