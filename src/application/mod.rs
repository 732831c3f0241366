pub mod admin;
pub mod chat;
pub mod cli;
pub mod console;
pub mod context;
pub mod history;
pub mod prompts;
