use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, text: &str) -> Notification {
        return Notification {
            level,
            text: text.to_string(),
        };
    }
}

/// An error whose text was already shown to the user as an error
/// notification. Callers that surface errors themselves skip these.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifiedError(pub String);
