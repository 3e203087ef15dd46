//! Market draft and submission errors.

use exotic_shared::types::{AmountError, TokenAmount};
use thiserror::Error;

use super::flow::CreateMarketAction;
use crate::transaction::TransactionError;

/// Errors from editing a market draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Adding a position would exceed the maximum.
    #[error("A market can have at most {max} positions")]
    TooManyPositions {
        /// Maximum number of positions.
        max: usize,
    },

    /// Removing a position would leave fewer than the minimum.
    #[error("A market needs at least {min} positions")]
    TooFewPositions {
        /// Minimum number of positions.
        min: usize,
    },

    /// No position at the given index.
    #[error("Position {index} out of range (len {len})")]
    PositionOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of positions.
        len: usize,
    },

    /// Ticket prices cannot be negative.
    #[error("Ticket price {0} is negative")]
    NegativeTicketPrice(TokenAmount),

    /// The ticket price has no base-unit representation.
    #[error("Invalid ticket price: {0}")]
    InvalidTicketPrice(#[from] AmountError),

    /// Adding a tag would exceed the maximum.
    #[error("A market can have at most {max} tags")]
    TooManyTags {
        /// Maximum number of tags.
        max: usize,
    },

    /// The tag is not among the suggestions.
    #[error("Unknown tag {0}")]
    UnknownTag(u64),

    /// No tag at the given index.
    #[error("Tag {index} out of range (len {len})")]
    TagOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of tags.
        len: usize,
    },
}

impl DraftError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TooManyPositions { .. } => "TOO_MANY_POSITIONS",
            Self::TooFewPositions { .. } => "TOO_FEW_POSITIONS",
            Self::PositionOutOfRange { .. } => "POSITION_OUT_OF_RANGE",
            Self::NegativeTicketPrice(_) => "NEGATIVE_TICKET_PRICE",
            Self::InvalidTicketPrice(_) => "INVALID_TICKET_PRICE",
            Self::TooManyTags { .. } => "TOO_MANY_TAGS",
            Self::UnknownTag(_) => "UNKNOWN_TAG",
            Self::TagOutOfRange { .. } => "TAG_OUT_OF_RANGE",
        }
    }
}

/// Errors from submitting a market.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateMarketError {
    /// The submit action is not "create market"; nothing was submitted.
    #[error("Market creation blocked: {}", .0.label_key())]
    Blocked(CreateMarketAction),

    /// The draft could not be turned into a creation call.
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// The creation transaction failed, was not ready, or its receipt
    /// carried no market.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl CreateMarketError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Blocked(_) => "BLOCKED",
            Self::Draft(e) => e.error_code(),
            Self::Transaction(e) => e.error_code(),
        }
    }
}

impl From<DraftError> for exotic_shared::AppError {
    fn from(err: DraftError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CreateMarketError> for exotic_shared::AppError {
    fn from(err: CreateMarketError) -> Self {
        match err {
            CreateMarketError::Blocked(_) => Self::NotReady(err.to_string()),
            CreateMarketError::Draft(e) => e.into(),
            CreateMarketError::Transaction(e) => e.into(),
        }
    }
}
