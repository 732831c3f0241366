mod application;
mod chat_backend;
mod confirm;
mod envelope;
mod event;
pub mod id;
mod locale;
mod message;
mod notification;
mod step;
mod user;

pub use application::*;
pub use chat_backend::*;
pub use confirm::*;
pub use envelope::*;
pub use event::*;
pub use locale::*;
pub use message::*;
pub use notification::*;
pub use step::*;
pub use user::*;
