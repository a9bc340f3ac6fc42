//! User-facing notifications

use std::fmt::Display;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Info,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub detail: String,
}

impl Notification {
    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Fire-and-forget sink for notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Session scoped notification hub.
///
/// Every subscriber gets its own receiver and sees all notifications
/// dispatched after it subscribed.
pub struct NotificationCenter {
    sender: broadcast::Sender<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn dispatch(&self, notification: Notification) {
        debug!(kind = %notification.kind, title = %notification.title, "Dispatching notification");
        // Sending only fails when nobody is listening
        if self.sender.send(notification).is_err() {
            debug!("Notification dropped, no subscribers");
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        self.dispatch(notification);
    }
}
