//! SessionManager struct and conversation navigation.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use milo_ai::InferenceGateway;
use milo_common::{Conversation, ConversationId, Event, EventBus, Message};
use milo_store::PersistenceGateway;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::SessionError;

use super::titler::AutoTitler;
use super::types::{SessionSettings, SessionSnapshot, SessionState};

/// Owns the open conversation and mediates every change to it.
///
/// All methods take `&self`; the manager is shared behind an `Arc`. Locks
/// are never held across an `.await`.
pub struct SessionManager {
    pub(super) store: Arc<dyn PersistenceGateway>,
    pub(super) inference: Arc<dyn InferenceGateway>,
    pub(super) events: Arc<EventBus>,
    pub(super) settings: SessionSettings,
    /// Open conversation, its messages, generating flag and error.
    pub(super) state: Mutex<SessionState>,
    /// History list, shared with the titler.
    pub(super) conversations: Arc<Mutex<Vec<Conversation>>>,
    /// Whether a `send_message` call is in flight.
    pub(super) busy: AtomicBool,
    pub(super) titler: AutoTitler,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        inference: Arc<dyn InferenceGateway>,
        events: Arc<EventBus>,
    ) -> Self {
        let conversations = Arc::new(Mutex::new(Vec::new()));
        let titler = AutoTitler::new(store.clone(), events.clone(), conversations.clone());
        Self {
            store,
            inference,
            events,
            settings: SessionSettings::default(),
            state: Mutex::new(SessionState::default()),
            conversations,
            busy: AtomicBool::new(false),
            titler,
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let conversations = self.conversations.lock().clone();
        let state = self.state.lock();
        SessionSnapshot {
            current_conversation_id: state.current_conversation_id.clone(),
            messages: state.messages.clone(),
            is_generating: state.is_generating,
            error: state.error.clone(),
            conversations,
        }
    }

    pub fn current_conversation_id(&self) -> Option<ConversationId> {
        self.state.lock().current_conversation_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn is_generating(&self) -> bool {
        self.state.lock().is_generating
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Conversation history, most recently updated first.
    pub fn conversations(&self) -> Vec<Conversation> {
        self.conversations.lock().clone()
    }

    /// Refresh the history list. Failures are logged and leave the list as is.
    pub async fn load_conversations(&self) {
        match self.store.list_conversations().await {
            Ok(list) => {
                debug!(count = list.len(), "loaded conversations");
                *self.conversations.lock() = list;
                self.events.publish(Event::ConversationsChanged);
            }
            Err(e) => warn!(error = %e, "failed to load conversations"),
        }
    }

    /// Make `id` the open conversation, replacing the visible messages.
    pub async fn load_conversation(&self, id: &ConversationId) -> Result<(), SessionError> {
        let loaded = match self.store.get_conversation(id).await {
            Ok(Some(_)) => self.store.list_messages(id).await,
            Ok(None) => {
                let err = SessionError::NotFound(id.clone());
                self.set_error(Some(err.to_string()));
                return Err(err);
            }
            Err(e) => Err(e),
        };

        let messages = match loaded {
            Ok(messages) => messages,
            Err(e) => {
                warn!(conversation = %id, error = %e, "failed to load conversation");
                let err = SessionError::LoadConversation(e);
                self.set_error(Some(err.to_string()));
                return Err(err);
            }
        };

        info!(conversation = %id, messages = messages.len(), "opened conversation");
        {
            let mut state = self.state.lock();
            state.current_conversation_id = Some(id.clone());
            state.messages = messages;
            state.error = None;
        }
        self.events.publish(Event::ConversationOpened(id.clone()));
        Ok(())
    }

    /// Close the open conversation without touching persistence.
    ///
    /// The next `send_message` creates a fresh conversation.
    pub fn start_new_conversation(&self) {
        self.close_current();
    }

    /// Reset the visible conversation. Persisted history is kept.
    pub fn clear_conversation(&self) {
        self.close_current();
    }

    /// Delete a conversation. Local state changes only after the store
    /// confirms; deleting the open conversation closes it.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<(), SessionError> {
        match self.store.delete_conversation(id).await {
            Ok(true) => {}
            Ok(false) => debug!(conversation = %id, "conversation already gone from store"),
            Err(e) => {
                warn!(conversation = %id, error = %e, "failed to delete conversation");
                let err = SessionError::DeleteConversation(e);
                self.set_error(Some(err.to_string()));
                return Err(err);
            }
        }

        self.conversations.lock().retain(|c| &c.id != id);
        let was_current = {
            let mut state = self.state.lock();
            if state.is_current(id) {
                state.close();
                true
            } else {
                false
            }
        };

        info!(conversation = %id, "deleted conversation");
        self.events.publish(Event::ConversationDeleted(id.clone()));
        if was_current {
            self.events.publish(Event::ConversationClosed);
        }
        self.events.publish(Event::ConversationsChanged);
        Ok(())
    }

    /// Give a conversation a user-chosen title.
    pub async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), SessionError> {
        let title = title.trim();
        match self.store.rename_conversation(id, title).await {
            Ok(true) => {}
            Ok(false) => return Err(SessionError::NotFound(id.clone())),
            Err(e) => {
                let err = SessionError::RenameConversation(e);
                self.set_error(Some(err.to_string()));
                return Err(err);
            }
        }

        if let Some(entry) = self.conversations.lock().iter_mut().find(|c| &c.id == id) {
            entry.title = title.to_string();
        }
        self.events.publish(Event::ConversationRetitled {
            id: id.clone(),
            title: title.to_string(),
        });
        Ok(())
    }

    pub(super) fn set_error(&self, error: Option<String>) {
        self.state.lock().error = error.clone();
        self.events.publish(Event::ErrorChanged(error));
    }

    fn close_current(&self) {
        let was_open = self.state.lock().close();
        if was_open {
            debug!("closed current conversation");
            self.events.publish(Event::ConversationClosed);
        }
    }
}
