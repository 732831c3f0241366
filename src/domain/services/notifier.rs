use tokio::sync::mpsc;

use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;

/// Sends transient user notifications to whatever view is listening.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn new() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();
        return (Notifier { tx }, rx);
    }

    pub fn notify(&self, level: NotificationLevel, text: &str) {
        if self.tx.send(Notification::new(level, text)).is_err() {
            tracing::debug!(level = %level, text, "Notification dropped, no listener");
        }
    }

    pub fn success(&self, text: &str) {
        self.notify(NotificationLevel::Success, text);
    }

    pub fn warning(&self, text: &str) {
        self.notify(NotificationLevel::Warning, text);
    }

    pub fn error(&self, text: &str) {
        self.notify(NotificationLevel::Error, text);
    }
}
