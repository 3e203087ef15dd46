//! Ledger error types.

use thiserror::Error;

/// Errors reported by a ledger implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The wallet or node refused the transaction before broadcast.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was included but execution reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// A read (allowance, balance, parameters) failed.
    #[error("ledger read failed: {0}")]
    Read(String),

    /// An event or return value could not be decoded.
    #[error("failed to decode ledger data: {0}")]
    Decode(String),
}

impl LedgerError {
    /// Create a rejected error.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a reverted error.
    #[must_use]
    pub fn reverted(msg: impl Into<String>) -> Self {
        Self::Reverted(msg.into())
    }

    /// Create a read error.
    #[must_use]
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Returns the error code for logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "TX_REJECTED",
            Self::Reverted(_) => "TX_REVERTED",
            Self::Read(_) => "READ_FAILURE",
            Self::Decode(_) => "DECODE_ERROR",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<LedgerError> for exotic_shared::AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Read(_) | LedgerError::Decode(_) => Self::Ledger(err.to_string()),
            LedgerError::Rejected(_) | LedgerError::Reverted(_) => {
                Self::Transaction(err.to_string())
            }
        }
    }
}
