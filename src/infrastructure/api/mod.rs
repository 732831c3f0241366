pub mod apps;
mod auth;
pub mod chat;
mod client;

pub use client::*;
