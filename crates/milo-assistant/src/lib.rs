//! MILO assistant core.
//!
//! Provides:
//! - `SessionManager`: the single source of truth for the open conversation
//! - `AutoTitler`: background titling after a conversation's first exchange
//! - `RevealEngine`: at-most-once typewriter reveal of assistant replies
//! - `VoiceTrigger`: speaks each new assistant reply once
//! - `PanelController`: expanded/collapsed panel state and confirmations

pub mod context;
pub mod error;
pub mod panel;
pub mod reveal;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::AssistantContext;
pub use error::SessionError;
pub use panel::{ConfirmedAction, PanelController, PanelState, PendingConfirmation, Rect};
pub use reveal::{
    RevealCache, RevealEngine, RevealPacing, RevealPhase, RevealSink, Typewriter, VoiceOutput,
    VoiceSettings, VoiceTrigger,
};
pub use session::{AutoTitler, SessionManager, SessionSettings, SessionSnapshot};
