//! Notification seam between the tracker and whatever renders toasts.

use std::fmt;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A user-facing message emitted by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

/// Sink for user-facing notifications.
///
/// The embedding UI supplies an implementation that renders toasts; the
/// tracker only ever calls `notify`.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default sink that routes notifications to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::error!("{}", notification.message),
            _ => tracing::info!("{}", notification.message),
        }
    }
}

/// Sink that forwards notifications over a channel for a UI thread to drain.
pub struct ChannelNotifier {
    tx: std::sync::mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end the UI should poll.
    pub fn new() -> (Self, std::sync::mpsc::Receiver<Notification>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means the UI is gone; nothing left to tell.
        let _ = self.tx.send(notification);
    }
}
