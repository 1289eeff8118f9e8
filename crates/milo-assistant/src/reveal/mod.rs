//! Incremental reveal of assistant replies.
//!
//! Each assistant message animates at most once per process, and only
//! while it is the newest message. The set of already-animated ids lives
//! in a `RevealCache` that outlives any view of the message list.

mod cache;
mod engine;
mod pacing;
mod typewriter;
mod voice;

pub use cache::{BoundedIdSet, RevealCache};
pub use engine::{RevealEngine, RevealPhase};
pub use pacing::RevealPacing;
pub use typewriter::{RevealSink, RevealStep, Typewriter};
pub use voice::{VoiceOutput, VoiceSettings, VoiceTrigger};
