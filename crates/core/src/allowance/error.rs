//! Approval error types.

use exotic_shared::types::{Address, AmountError};
use thiserror::Error;

use crate::transaction::TransactionError;

/// Errors that can occur when requesting a bond approval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalError {
    /// An approval for the same owner and spender is still in flight.
    #[error("Approval already pending for {owner} -> {spender}")]
    AlreadyPending {
        /// Owner of the funds.
        owner: Address,
        /// Spender being approved.
        spender: Address,
    },

    /// The required amount has no base-unit representation.
    #[error("Invalid approval amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The approval transaction itself failed or was not ready.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl ApprovalError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyPending { .. } => "ALREADY_PENDING",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Transaction(e) => e.error_code(),
        }
    }

    /// Returns true if the refusal happened before anything was submitted.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        match self {
            Self::AlreadyPending { .. } => true,
            Self::Transaction(e) => e.is_not_ready(),
            Self::InvalidAmount(_) => false,
        }
    }
}

impl From<ApprovalError> for exotic_shared::AppError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::AlreadyPending { .. } => Self::NotReady(err.to_string()),
            ApprovalError::InvalidAmount(_) => Self::Validation(err.to_string()),
            ApprovalError::Transaction(e) => e.into(),
        }
    }
}
