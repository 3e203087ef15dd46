//! Dispute voting errors.

use thiserror::Error;

use super::types::VoteAction;
use crate::transaction::TransactionError;

/// Errors that can occur while voting on a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisputeError {
    /// Only oracle council members vote.
    #[error("Account is not an oracle council member")]
    NotCouncilMember,

    /// The option is not offered in the market's current phase.
    #[error("Voting option {code} is not available in this phase")]
    OptionUnavailable {
        /// Option code.
        code: i32,
    },

    /// No outcome candidate has this value.
    #[error("Position {0} is not a candidate")]
    UnknownPosition(i32),

    /// The candidate is the position that already won.
    #[error("Position {0} already won and cannot be selected")]
    PositionDisabled(i32),

    /// The submit control is a prompt, not an action.
    #[error("Vote blocked: {}", .0.label_key())]
    Blocked(VoteAction),

    /// The selection equals the recorded vote.
    #[error("Vote unchanged")]
    Unchanged,

    /// The vote transaction failed or was not ready.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl DisputeError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotCouncilMember => "NOT_COUNCIL_MEMBER",
            Self::OptionUnavailable { .. } => "OPTION_UNAVAILABLE",
            Self::UnknownPosition(_) => "UNKNOWN_POSITION",
            Self::PositionDisabled(_) => "POSITION_DISABLED",
            Self::Blocked(_) => "BLOCKED",
            Self::Unchanged => "UNCHANGED",
            Self::Transaction(e) => e.error_code(),
        }
    }
}

impl From<DisputeError> for exotic_shared::AppError {
    fn from(err: DisputeError) -> Self {
        match err {
            DisputeError::NotCouncilMember | DisputeError::Blocked(_) | DisputeError::Unchanged => {
                Self::NotReady(err.to_string())
            }
            DisputeError::OptionUnavailable { .. }
            | DisputeError::UnknownPosition(_)
            | DisputeError::PositionDisabled(_) => Self::Validation(err.to_string()),
            DisputeError::Transaction(e) => e.into(),
        }
    }
}
