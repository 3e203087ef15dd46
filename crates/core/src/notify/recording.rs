//! In-memory notifier and navigator that record what they were asked to show.

use std::sync::{Mutex, PoisonError};

use exotic_shared::types::{Address, NotificationId};

use super::notifier::{Navigator, Notice, Notifier};

/// State of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Still loading.
    Pending,
    /// Resolved as success.
    Success,
    /// Resolved as error.
    Error,
}

/// A notification as currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification id.
    pub id: NotificationId,
    /// Current state.
    pub kind: NotificationKind,
    /// Current message.
    pub notice: Notice,
}

/// Notifier keeping every notification in creation order.
///
/// Updates replace the state of an existing notification in place, the
/// same way a toast is updated rather than stacked.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notifications.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, id: NotificationId, kind: NotificationKind, notice: Notice) {
        let mut notifications = self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(existing) => {
                existing.kind = kind;
                existing.notice = notice;
            }
            None => tracing::warn!(notification_id = %id, "update for unknown notification"),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify_pending(&self, notice: Notice) -> NotificationId {
        let id = NotificationId::new();
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                id,
                kind: NotificationKind::Pending,
                notice,
            });
        id
    }

    fn notify_success(&self, id: NotificationId, notice: Notice) {
        self.update(id, NotificationKind::Success, notice);
    }

    fn notify_error(&self, id: NotificationId, notice: Notice) {
        self.update(id, NotificationKind::Error, notice);
    }
}

/// Navigator remembering every market it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Address>>,
}

impl RecordingNavigator {
    /// Creates an empty navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markets navigated to, in order.
    #[must_use]
    pub fn visited(&self) -> Vec<Address> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_market(&self, address: Address) {
        tracing::debug!(route = %super::market_link(address), "navigate");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_then_success_updates_in_place() {
        let notifier = RecordingNotifier::new();
        let id = notifier.notify_pending(Notice::TransactionPending);
        notifier.notify_success(id, Notice::VoteSuccess);

        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
        assert_eq!(notifications[0].notice, Notice::VoteSuccess);
    }

    #[test]
    fn test_update_unknown_id_is_ignored() {
        let notifier = RecordingNotifier::new();
        notifier.notify_error(NotificationId::new(), Notice::UnknownError);
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_navigator_records() {
        let navigator = RecordingNavigator::new();
        navigator.navigate_to_market(Address::from_low_byte(3));
        assert_eq!(navigator.visited(), vec![Address::from_low_byte(3)]);
    }
}
