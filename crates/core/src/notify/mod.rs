//! Notification and navigation interfaces exposed to the UI collaborator.
//!
//! The engine reports transaction progress through a [`Notifier`]: one
//! pending notification per submission, later updated to success or error.
//! Successful market creation navigates through a [`Navigator`].

mod notifier;
mod recording;

pub use notifier::{Navigator, Notice, Notifier, TracingNotifier, market_link};
pub use recording::{Notification, NotificationKind, RecordingNavigator, RecordingNotifier};

#[cfg(test)]
pub use notifier::{MockNavigator, MockNotifier};
