//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Module-level errors in the core crate convert into this type at the
/// application boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Preconditions for an action are unmet (no signer, action already in flight).
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A ledger write was rejected, reverted or produced an unusable receipt.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Ledger read error.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for logs and UI collaborators.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "NOT_READY",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Transaction(_) => "TRANSACTION_FAILED",
            Self::Ledger(_) => "LEDGER_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error should be shown to the user.
    ///
    /// `NotReady` is never surfaced: the action is simply not offered.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::NotReady(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
