use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use milo_common::{Conversation, ConversationId, Event, EventBus, Message};
use milo_config::schema::AssistantConfig;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::SessionError;

/// Tunables for the session manager.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Most recent messages sent as inference context.
    pub context_window: usize,
    /// Give up on a reply after this long. `None` waits forever.
    pub inference_timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for SessionSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            context_window: config.context_window as usize,
            inference_timeout: config.inference_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Point-in-time copy of the state a UI renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub current_conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
    pub is_generating: bool,
    pub error: Option<String>,
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub current_conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
    pub is_generating: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_current(&self, id: &ConversationId) -> bool {
        self.current_conversation_id.as_ref() == Some(id)
    }

    /// Close the open conversation. Returns whether anything was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.current_conversation_id.is_some() || !self.messages.is_empty();
        self.current_conversation_id = None;
        self.messages.clear();
        self.error = None;
        was_open
    }
}

/// Holds the send slot for the lifetime of one `send_message` call.
///
/// Dropping the guard frees the slot and clears a generating flag that
/// is still raised, so an abandoned send can never leave the session stuck.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a Mutex<SessionState>,
    events: &'a EventBus,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to take the send slot. Returns `Err` if a send is in flight.
    pub(crate) fn acquire(
        flag: &'a AtomicBool,
        state: &'a Mutex<SessionState>,
        events: &'a EventBus,
    ) -> Result<Self, SessionError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        Ok(Self {
            flag,
            state,
            events,
        })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let was_generating = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.is_generating, false)
        };
        if was_generating {
            self.events.publish(Event::GeneratingChanged(false));
        }
        self.flag.store(false, Ordering::Release);
    }
}
