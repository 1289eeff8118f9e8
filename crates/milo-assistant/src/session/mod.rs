//! Conversation session management.
//!
//! The `SessionManager` owns the currently open conversation, its messages,
//! the generating flag and the last user-visible error. Everything else
//! (panel, reveal, voice) reads from it.

mod chat;
mod manager;
mod titler;
mod types;

#[cfg(test)]
mod tests;

pub use manager::SessionManager;
pub use titler::AutoTitler;
pub use types::{SessionSettings, SessionSnapshot};
