//! Transaction workflow error types.

use std::fmt;

use thiserror::Error;

use super::types::TxKind;
use crate::ledger::LedgerError;

/// Why a workflow refused to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    /// No signer is connected.
    NoSigner,
    /// A transaction of this kind is already live.
    AlreadyPending,
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSigner => f.write_str("no signer connected"),
            Self::AlreadyPending => f.write_str("a transaction is already pending"),
        }
    }
}

/// Errors that can occur while running a transaction workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Preconditions unmet; nothing was submitted and nothing was shown.
    #[error("{kind} not ready: {reason}")]
    NotReady {
        /// The workflow's transaction kind.
        kind: TxKind,
        /// What was missing.
        reason: NotReadyReason,
    },

    /// The wallet or node declined the transaction before broadcast.
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    /// The receipt reports a revert or is otherwise unusable.
    #[error("Confirmation failed: {0}")]
    ConfirmationFailed(String),

    /// The transaction confirmed but the expected result could not be
    /// extracted from its receipt.
    #[error("Malformed receipt: {0}")]
    MalformedReceipt(String),
}

impl TransactionError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady { .. } => "NOT_READY",
            Self::SubmissionRejected(_) => "SUBMISSION_REJECTED",
            Self::ConfirmationFailed(_) => "CONFIRMATION_FAILED",
            Self::MalformedReceipt(_) => "MALFORMED_RECEIPT",
        }
    }

    /// Returns true if the error is surfaced through a failure notification.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::SubmissionRejected(_) | Self::ConfirmationFailed(_)
        )
    }

    /// Returns true if this is a `NotReady` refusal.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }

    /// Classifies a ledger error raised while submitting.
    pub(crate) fn from_submission(err: LedgerError) -> Self {
        Self::SubmissionRejected(err.to_string())
    }

    /// Classifies a ledger error raised while awaiting the receipt.
    pub(crate) fn from_confirmation(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(_) => Self::SubmissionRejected(err.to_string()),
            LedgerError::Reverted(_) | LedgerError::Read(_) | LedgerError::Decode(_) => {
                Self::ConfirmationFailed(err.to_string())
            }
        }
    }
}

impl From<TransactionError> for exotic_shared::AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotReady { .. } => Self::NotReady(err.to_string()),
            _ => Self::Transaction(err.to_string()),
        }
    }
}
