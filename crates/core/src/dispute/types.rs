//! Dispute voting types.

use std::fmt;

use exotic_shared::types::Address;
use serde::{Deserialize, Serialize};

use crate::ledger::ConfirmedVote;

/// Translation key of the synthetic "cancel" outcome.
pub const CANCEL_LABEL_KEY: &str = "common.cancel";

/// Sentinel for "no vote cast" / "no position chosen".
pub const NO_SELECTION: i32 = -1;

/// What a council member can vote for on a dispute.
///
/// The discriminants are the codes the oracle council contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DisputeVotingOption {
    /// Accept the dispute and slash the market creator.
    AcceptSlash = 1,
    /// Accept the dispute without slashing.
    AcceptNoSlash = 2,
    /// Refuse a dispute raised during positioning.
    RefuseOnPositioning = 3,
    /// Accept the dispute and set a different result.
    AcceptResult = 4,
    /// Accept the dispute and reset the result.
    AcceptReset = 5,
    /// Refuse a dispute raised after maturity.
    RefuseMature = 6,
}

/// Options offered while the market is still in its positioning phase.
pub const MARKET_OPEN_OPTIONS: [DisputeVotingOption; 3] = [
    DisputeVotingOption::AcceptSlash,
    DisputeVotingOption::AcceptNoSlash,
    DisputeVotingOption::RefuseOnPositioning,
];

/// Options offered once the market has been resolved.
pub const MARKET_RESOLVED_OPTIONS: [DisputeVotingOption; 3] = [
    DisputeVotingOption::AcceptResult,
    DisputeVotingOption::AcceptReset,
    DisputeVotingOption::RefuseMature,
];

impl DisputeVotingOption {
    /// Contract code of the option.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Parses a contract code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::AcceptSlash),
            2 => Some(Self::AcceptNoSlash),
            3 => Some(Self::RefuseOnPositioning),
            4 => Some(Self::AcceptResult),
            5 => Some(Self::AcceptReset),
            6 => Some(Self::RefuseMature),
            _ => None,
        }
    }

    /// The options offered in the given market phase.
    #[must_use]
    pub const fn for_phase(in_positioning_phase: bool) -> &'static [Self] {
        if in_positioning_phase {
            &MARKET_OPEN_OPTIONS
        } else {
            &MARKET_RESOLVED_OPTIONS
        }
    }

    /// Translation key of the option label.
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::AcceptSlash => "market.dispute.voting-options.accept-slash",
            Self::AcceptNoSlash => "market.dispute.voting-options.accept-no-slash",
            Self::RefuseOnPositioning => "market.dispute.voting-options.refuse-on-positioning",
            Self::AcceptResult => "market.dispute.voting-options.accept-result",
            Self::AcceptReset => "market.dispute.voting-options.accept-reset",
            Self::RefuseMature => "market.dispute.voting-options.refuse-mature",
        }
    }
}

impl fmt::Display for DisputeVotingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A dispute raised against a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeInfo {
    /// Disputed market.
    pub market: Address,
    /// Dispute number within the market.
    pub dispute_number: u64,
    /// True while the market is still in its positioning phase.
    pub is_in_positioning_phase: bool,
}

/// An outcome position a member may vote to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeCandidate {
    /// Position label, or the cancel key for the synthetic last entry.
    pub label: String,
    /// Position value sent to the contract.
    pub value: i32,
    /// True for the position that already won.
    pub disabled: bool,
}

/// Builds the outcome candidates for a market.
///
/// The market's positions are followed by a synthetic "cancel" entry. The
/// candidate at 1-based index `winning_position` is disabled. Values are the
/// 1-based index shifted cyclically, so "cancel" takes value 0.
#[must_use]
pub fn outcome_candidates(positions: &[String], winning_position: i32) -> Vec<OutcomeCandidate> {
    let labels: Vec<&str> = positions
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(CANCEL_LABEL_KEY))
        .collect();
    let len = labels.len();
    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| {
            let one_based = index + 1;
            OutcomeCandidate {
                label: label.to_string(),
                value: i32::try_from(one_based % len).unwrap_or(i32::MAX),
                disabled: i32::try_from(one_based).is_ok_and(|i| i == winning_position),
            }
        })
        .collect()
}

/// Working and confirmed vote of one council member on one dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisputeVoteState {
    /// Option the member has selected (0 or -1 when none).
    pub selected_vote: i32,
    /// Outcome position the member has selected (-1 when none).
    pub selected_position: i32,
    /// Option recorded on the ledger (-1 when none).
    pub confirmed_vote: i32,
    /// Position recorded on the ledger (-1 when none).
    pub confirmed_position: i32,
}

impl DisputeVoteState {
    /// Starts with the selection equal to the recorded vote.
    #[must_use]
    pub const fn from_confirmed(confirmed: ConfirmedVote) -> Self {
        Self {
            selected_vote: confirmed.vote,
            selected_position: confirmed.position,
            confirmed_vote: confirmed.vote,
            confirmed_position: confirmed.position,
        }
    }

    /// The recorded vote.
    #[must_use]
    pub const fn confirmed(&self) -> ConfirmedVote {
        ConfirmedVote {
            vote: self.confirmed_vote,
            position: self.confirmed_position,
        }
    }

    /// Returns true if the selection accepts a result.
    #[must_use]
    pub const fn accepts_result(&self) -> bool {
        self.selected_vote == DisputeVotingOption::AcceptResult.code()
    }

    /// A legal option is selected.
    #[must_use]
    pub const fn vote_selected(&self) -> bool {
        self.selected_vote > 0
    }

    /// A position is selected, or the selected option needs none.
    #[must_use]
    pub const fn position_selected(&self) -> bool {
        !self.accepts_result() || self.selected_position > NO_SELECTION
    }

    /// Nothing has been recorded on the ledger yet.
    #[must_use]
    pub const fn can_submit_first_vote(&self) -> bool {
        self.confirmed_vote == NO_SELECTION && self.confirmed_position == NO_SELECTION
    }

    /// The selection differs from the recorded vote.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.confirmed_vote != self.selected_vote
            || self.confirmed_position != self.selected_position
    }

    /// Position sent with the vote: the selection when accepting a result,
    /// 0 otherwise.
    #[must_use]
    pub const fn submitted_position(&self) -> i32 {
        if self.accepts_result() {
            self.selected_position
        } else {
            0
        }
    }
}

/// The submit control of a dispute card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// No option selected yet.
    SelectVote,
    /// Accepting a result without a position.
    SelectOutcome,
    /// First vote on this dispute.
    Vote {
        /// A vote is in flight.
        in_progress: bool,
    },
    /// Changing a recorded vote.
    ChangeVote {
        /// A vote is in flight.
        in_progress: bool,
    },
}

impl VoteAction {
    /// Translation key of the button label.
    #[must_use]
    pub const fn label_key(&self) -> &'static str {
        match self {
            Self::SelectVote => "common.errors.select-vote",
            Self::SelectOutcome => "common.errors.select-outcome",
            Self::Vote { in_progress: false } => "market.dispute.button.vote-label",
            Self::Vote { in_progress: true } => "market.dispute.button.vote-progress-label",
            Self::ChangeVote { in_progress: false } => "market.dispute.button.change-vote-label",
            Self::ChangeVote { in_progress: true } => {
                "market.dispute.button.change-vote-progress-label"
            }
        }
    }

    /// Returns true if the button can be pressed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        match self {
            Self::SelectVote | Self::SelectOutcome => false,
            Self::Vote { in_progress } | Self::ChangeVote { in_progress } => !*in_progress,
        }
    }
}
