//! Dispute voting state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::error::DisputeError;
use super::types::{
    DisputeInfo, DisputeVoteState, DisputeVotingOption, OutcomeCandidate, VoteAction,
    outcome_candidates,
};
use crate::ledger::{ConfirmedVote, Ledger, LedgerReader, VoteCall};
use crate::notify::Notifier;
use crate::rules::{Rule, first_match};
use crate::session::SessionContext;
use crate::transaction::{NotReadyReason, TransactionError, TransactionWorkflow, TxKind};

/// Inputs of the submit ladder.
struct VoteContext {
    state: DisputeVoteState,
    council_member: bool,
    submitting: bool,
}

/// First match wins; `None` means no submit control is rendered.
const VOTE_RULES: [Rule<VoteContext, Option<VoteAction>>; 5] = [
    Rule::new("non-member", |c| !c.council_member, |_| None),
    Rule::new(
        "select-vote",
        |c| !c.state.vote_selected(),
        |_| Some(VoteAction::SelectVote),
    ),
    Rule::new(
        "select-outcome",
        |c| !c.state.position_selected(),
        |_| Some(VoteAction::SelectOutcome),
    ),
    Rule::new(
        "first-vote",
        |c| c.state.can_submit_first_vote(),
        |c| {
            Some(VoteAction::Vote {
                in_progress: c.submitting,
            })
        },
    ),
    Rule::new(
        "change-vote",
        |c| c.state.changed(),
        |c| {
            Some(VoteAction::ChangeVote {
                in_progress: c.submitting,
            })
        },
    ),
];

/// Voting state of one dispute card.
///
/// Selections are working copies; the confirmed vote is what the ledger
/// holds, updated optimistically after a confirmed vote and optionally
/// re-read.
pub struct DisputeVotingMachine {
    dispute: DisputeInfo,
    candidates: Vec<OutcomeCandidate>,
    state: Mutex<DisputeVoteState>,
    council_member: Mutex<bool>,
    workflow: TransactionWorkflow,
    reconcile_after_vote: bool,
}

impl DisputeVotingMachine {
    /// Creates a machine for a member whose recorded vote is `confirmed`.
    ///
    /// Council membership starts unknown (false) until
    /// [`Self::refresh_membership`] or [`Self::with_council_member`].
    #[must_use]
    pub fn new(
        dispute: DisputeInfo,
        positions: &[String],
        winning_position: i32,
        confirmed: ConfirmedVote,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            dispute,
            candidates: outcome_candidates(positions, winning_position),
            state: Mutex::new(DisputeVoteState::from_confirmed(confirmed)),
            council_member: Mutex::new(false),
            workflow: TransactionWorkflow::new(TxKind::CastVote, notifier),
            reconcile_after_vote: false,
        }
    }

    /// Reads membership and the recorded vote for the session's account.
    ///
    /// Read failures are logged; the machine then starts as a non-member
    /// with no recorded vote.
    pub async fn load<R: LedgerReader>(
        reader: &R,
        session: &SessionContext,
        dispute: DisputeInfo,
        positions: &[String],
        winning_position: i32,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let confirmed = match session.account {
            Some(voter) => reader
                .dispute_vote(dispute.market, dispute.dispute_number, voter)
                .await
                .unwrap_or_else(|e| {
                    warn!(market = %dispute.market, error = %e, "dispute vote read failed");
                    ConfirmedVote::NONE
                }),
            None => ConfirmedVote::NONE,
        };
        let machine = Self::new(dispute, positions, winning_position, confirmed, notifier);
        machine.refresh_membership(reader, session).await;
        machine
    }

    /// Sets council membership directly.
    #[must_use]
    pub fn with_council_member(self, council_member: bool) -> Self {
        *lock(&self.council_member) = council_member;
        self
    }

    /// Re-reads the recorded vote after every confirmed vote.
    #[must_use]
    pub fn with_reconcile(mut self, reconcile: bool) -> Self {
        self.reconcile_after_vote = reconcile;
        self
    }

    /// The dispute this machine votes on.
    #[must_use]
    pub fn dispute(&self) -> &DisputeInfo {
        &self.dispute
    }

    /// Current vote state.
    #[must_use]
    pub fn state(&self) -> DisputeVoteState {
        *lock(&self.state)
    }

    /// Returns true if the session's account sits on the council.
    #[must_use]
    pub fn is_council_member(&self) -> bool {
        *lock(&self.council_member)
    }

    /// Returns true while a vote is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.workflow.is_busy()
    }

    /// Options offered in the market's current phase.
    #[must_use]
    pub fn options(&self) -> &'static [DisputeVotingOption] {
        DisputeVotingOption::for_phase(self.dispute.is_in_positioning_phase)
    }

    /// All outcome candidates, including the disabled winning position.
    #[must_use]
    pub fn candidates(&self) -> &[OutcomeCandidate] {
        &self.candidates
    }

    /// Candidates the member can pick right now: the enabled ones, and
    /// only while accepting a result.
    #[must_use]
    pub fn selectable_positions(&self) -> Vec<&OutcomeCandidate> {
        if !self.state().accepts_result() {
            return Vec::new();
        }
        self.candidates.iter().filter(|c| !c.disabled).collect()
    }

    /// Re-reads council membership.
    ///
    /// Without a signer the account is not a member. A read failure keeps
    /// the last known value.
    pub async fn refresh_membership<R: LedgerReader>(
        &self,
        reader: &R,
        session: &SessionContext,
    ) -> bool {
        let Some(account) = session.signer() else {
            *lock(&self.council_member) = false;
            return false;
        };
        match reader.is_oracle_council_member(account).await {
            Ok(member) => {
                *lock(&self.council_member) = member;
                member
            }
            Err(e) => {
                warn!(account = %account, error = %e, "council membership read failed");
                self.is_council_member()
            }
        }
    }

    /// Selects a voting option.
    pub fn select_vote(&self, option: DisputeVotingOption) -> Result<(), DisputeError> {
        if !self.options().contains(&option) {
            return Err(DisputeError::OptionUnavailable {
                code: option.code(),
            });
        }
        lock(&self.state).selected_vote = option.code();
        debug!(market = %self.dispute.market, vote = %option, "vote selected");
        Ok(())
    }

    /// Selects the outcome position with contract value `value`.
    pub fn select_position(&self, value: i32) -> Result<(), DisputeError> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| c.value == value)
            .ok_or(DisputeError::UnknownPosition(value))?;
        if candidate.disabled {
            return Err(DisputeError::PositionDisabled(value));
        }
        lock(&self.state).selected_position = value;
        debug!(market = %self.dispute.market, position = value, "position selected");
        Ok(())
    }

    /// Resolves the submit control. `None` renders nothing.
    #[must_use]
    pub fn action(&self) -> Option<VoteAction> {
        let ctx = VoteContext {
            state: self.state(),
            council_member: self.is_council_member(),
            submitting: self.workflow.is_busy(),
        };
        first_match(&ctx, &VOTE_RULES).flatten()
    }

    /// Submits the selected vote.
    ///
    /// On confirmation the recorded vote becomes the submitted one. With
    /// reconciliation enabled it is then re-read from the ledger.
    pub async fn submit<L: Ledger>(
        &self,
        session: &SessionContext,
        ledger: &L,
    ) -> Result<ConfirmedVote, DisputeError> {
        let not_ready = |reason| TransactionError::NotReady {
            kind: TxKind::CastVote,
            reason,
        };
        if session.signer().is_none() {
            debug!("vote refused: no signer");
            return Err(not_ready(NotReadyReason::NoSigner).into());
        }
        if !self.is_council_member() {
            return Err(DisputeError::NotCouncilMember);
        }
        match self.action() {
            Some(
                VoteAction::Vote { in_progress: true } | VoteAction::ChangeVote { in_progress: true },
            ) => {
                debug!("vote refused: already pending");
                return Err(not_ready(NotReadyReason::AlreadyPending).into());
            }
            Some(VoteAction::Vote { .. } | VoteAction::ChangeVote { .. }) => {}
            Some(blocked) => return Err(DisputeError::Blocked(blocked)),
            None => return Err(DisputeError::Unchanged),
        }

        let state = self.state();
        let call = VoteCall {
            market: self.dispute.market,
            dispute_number: self.dispute.dispute_number,
            vote: state.selected_vote,
            position: state.submitted_position(),
        };
        info!(
            market = %call.market,
            dispute_number = call.dispute_number,
            vote = call.vote,
            position = call.position,
            "casting dispute vote"
        );

        self.workflow
            .submit(
                session,
                |signer| ledger.vote_for_dispute(signer, call),
                |_| Ok(()),
            )
            .await?;

        let confirmed = ConfirmedVote {
            vote: call.vote,
            position: call.position,
        };
        {
            let mut current = lock(&self.state);
            current.confirmed_vote = confirmed.vote;
            current.confirmed_position = confirmed.position;
            if current.selected_vote == confirmed.vote {
                current.selected_position = confirmed.position;
            }
        }

        if self.reconcile_after_vote {
            return Ok(self.reconcile(ledger, session).await);
        }
        Ok(confirmed)
    }

    /// Replaces the recorded vote with the ledger's.
    ///
    /// Selections that matched the old recorded vote follow the new one.
    /// A read failure keeps the current values.
    pub async fn reconcile<R: LedgerReader>(
        &self,
        reader: &R,
        session: &SessionContext,
    ) -> ConfirmedVote {
        let Some(voter) = session.account else {
            return self.state().confirmed();
        };
        let read = reader
            .dispute_vote(self.dispute.market, self.dispute.dispute_number, voter)
            .await;
        match read {
            Ok(recorded) => {
                let mut state = lock(&self.state);
                if !state.changed() {
                    state.selected_vote = recorded.vote;
                    state.selected_position = recorded.position;
                }
                state.confirmed_vote = recorded.vote;
                state.confirmed_position = recorded.position;
                debug!(
                    market = %self.dispute.market,
                    vote = recorded.vote,
                    position = recorded.position,
                    "dispute vote reconciled"
                );
                recorded
            }
            Err(e) => {
                warn!(market = %self.dispute.market, error = %e, "dispute vote read failed");
                self.state().confirmed()
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
