use super::Message;

/// Notifications dispatched on the event bus so every view of the message
/// history stays in sync.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    NewMessage(Message),
    MessageDeleted(Vec<String>),
    MessageCancelled(),
}
