mod auth;
mod chat_session;
pub mod clipboard;
mod credentials;
mod event_bus;
mod export;
mod message_list;
mod notifier;

pub use auth::*;
pub use chat_session::*;
pub use credentials::*;
pub use event_bus::*;
pub use export::*;
pub use message_list::*;
pub use notifier::*;
