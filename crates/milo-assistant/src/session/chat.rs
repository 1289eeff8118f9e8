use milo_ai::{bounded_history, AiError};
use milo_common::{ConversationId, Event, Message, Role};
use tracing::{debug, info, warn};

use crate::error::SessionError;

use super::manager::SessionManager;
use super::types::BusyGuard;

impl SessionManager {
    /// Send a user message and wait for the assistant's reply.
    ///
    /// Blank input is ignored (`Ok(None)`). Without an open conversation a
    /// new one is created first. The user message is persisted and shown
    /// before inference starts and is kept even when inference fails. A
    /// second call while one is in flight is rejected with `Busy` and
    /// changes nothing.
    pub async fn send_message(&self, text: &str) -> Result<Option<Message>, SessionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let _guard = BusyGuard::acquire(&self.busy, &self.state, &self.events)?;

        let (conversation_id, prior) = self.ensure_conversation().await?;

        let user_message = match self.store.append_message(&conversation_id, Role::User, text).await
        {
            Ok(message) => message,
            Err(e) => {
                warn!(conversation = %conversation_id, error = %e, "failed to persist user message");
                return Err(self.fail(SessionError::SendMessage(e)));
            }
        };

        {
            let mut state = self.state.lock();
            if state.is_current(&conversation_id) {
                state.messages.push(user_message.clone());
            }
            state.is_generating = true;
            state.error = None;
        }
        self.events.publish(Event::MessageAppended(user_message.id.clone()));
        self.events.publish(Event::ErrorChanged(None));
        self.events.publish(Event::GeneratingChanged(true));

        let first_exchange = prior.is_empty();
        let mut context = prior;
        context.push(user_message);
        let history = bounded_history(&context, self.settings.context_window);
        debug!(
            conversation = %conversation_id,
            history = history.len(),
            "requesting assistant reply"
        );

        let reply = match self.settings.inference_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inference.chat(text, &history))
                .await
                .unwrap_or(Err(AiError::Timeout)),
            None => self.inference.chat(text, &history).await,
        };

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(conversation = %conversation_id, error = %e, "inference failed");
                self.stop_generating();
                return Err(self.fail(SessionError::Inference(e)));
            }
        };

        let assistant_message = match self
            .store
            .append_message(&conversation_id, Role::Assistant, &reply)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                warn!(conversation = %conversation_id, error = %e, "failed to persist reply");
                self.stop_generating();
                return Err(self.fail(SessionError::SaveReply(e)));
            }
        };

        let still_current = {
            let mut state = self.state.lock();
            let current = state.is_current(&conversation_id);
            if current {
                state.messages.push(assistant_message.clone());
            }
            state.is_generating = false;
            current
        };
        if still_current {
            self.events
                .publish(Event::MessageAppended(assistant_message.id.clone()));
        } else {
            info!(conversation = %conversation_id, "reply landed after switching away");
        }
        self.events.publish(Event::GeneratingChanged(false));

        if first_exchange {
            self.titler.spawn(conversation_id);
        }
        Ok(Some(assistant_message))
    }

    /// Return the open conversation and its messages, creating a
    /// conversation when none is open.
    async fn ensure_conversation(&self) -> Result<(ConversationId, Vec<Message>), SessionError> {
        {
            let state = self.state.lock();
            if let Some(id) = &state.current_conversation_id {
                return Ok((id.clone(), state.messages.clone()));
            }
        }

        let conversation = match self.store.create_conversation(None).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!(error = %e, "failed to create conversation");
                return Err(self.fail(SessionError::CreateConversation(e)));
            }
        };

        info!(conversation = %conversation.id, "created conversation");
        {
            let mut state = self.state.lock();
            state.current_conversation_id = Some(conversation.id.clone());
            state.messages.clear();
        }
        self.conversations.lock().insert(0, conversation.clone());
        self.events
            .publish(Event::ConversationOpened(conversation.id.clone()));
        self.events.publish(Event::ConversationsChanged);
        Ok((conversation.id, Vec::new()))
    }

    fn stop_generating(&self) {
        self.state.lock().is_generating = false;
        self.events.publish(Event::GeneratingChanged(false));
    }

    /// Record `err` as the visible error and hand it back.
    fn fail(&self, err: SessionError) -> SessionError {
        self.set_error(Some(err.to_string()));
        err
    }
}
