//! Notifier and navigator traits.

use std::fmt;

use exotic_shared::types::{Address, NotificationId};

#[cfg(test)]
use mockall::automock;

/// User-visible messages, identified by their translation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// A transaction was submitted and awaits confirmation.
    TransactionPending,
    /// The bond approval confirmed.
    ApproveSuccess,
    /// The market was created.
    CreateMarketSuccess,
    /// The dispute vote was recorded.
    VoteSuccess,
    /// Generic failure; the user may retry.
    UnknownError,
}

impl Notice {
    /// Returns the translation key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::TransactionPending => "market.toast-message.transaction-pending",
            Self::ApproveSuccess => "market.toast-message.approve-success",
            Self::CreateMarketSuccess => "market.toast-message.create-market-success",
            Self::VoteSuccess => "market.toast-message.vote-success",
            Self::UnknownError => "common.errors.unknown-error-try-again",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Toast-style notification sink.
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    /// Shows a loading notification and returns its id.
    fn notify_pending(&self, notice: Notice) -> NotificationId;

    /// Turns notification `id` into a success message.
    fn notify_success(&self, id: NotificationId, notice: Notice);

    /// Turns notification `id` into an error message.
    fn notify_error(&self, id: NotificationId, notice: Notice);
}

/// Client-side navigation.
#[cfg_attr(test, automock)]
pub trait Navigator: Send + Sync {
    /// Opens the page of the market at `address`.
    fn navigate_to_market(&self, address: Address);
}

/// Route of a market's page.
#[must_use]
pub fn market_link(address: Address) -> String {
    format!("/markets/{address}")
}

/// Notifier that only logs, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_pending(&self, notice: Notice) -> NotificationId {
        let id = NotificationId::new();
        tracing::info!(notification_id = %id, notice = notice.key(), "pending");
        id
    }

    fn notify_success(&self, id: NotificationId, notice: Notice) {
        tracing::info!(notification_id = %id, notice = notice.key(), "success");
    }

    fn notify_error(&self, id: NotificationId, notice: Notice) {
        tracing::warn!(notification_id = %id, notice = notice.key(), "error");
    }
}
