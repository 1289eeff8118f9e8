//! Fakes for the persistence, inference and voice seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use milo_ai::{AiError, HistoryMessage, InferenceGateway};
use milo_common::{Conversation, ConversationId, EventBus, Message, MessageId, Role};
use milo_store::{InMemoryStore, PersistenceGateway, StoreError, StoreResult};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::reveal::{VoiceOutput, VoiceSettings};
use crate::session::{SessionManager, SessionSettings};

/// A write made through the store, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreWrite {
    Create,
    Append(Role),
}

/// In-memory store with switchable failures and call counters.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: InMemoryStore,
    writes: Mutex<Vec<StoreWrite>>,
    pub fail_create: AtomicBool,
    pub fail_append: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_load: AtomicBool,
    pub fail_delete: AtomicBool,
    pub auto_title_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.writes.lock().clone()
    }

    fn check(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidData("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for FlakyStore {
    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        Self::check(&self.fail_list)?;
        self.inner.list_conversations().await
    }

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        Self::check(&self.fail_load)?;
        self.inner.get_conversation(id).await
    }

    async fn create_conversation(&self, title: Option<&str>) -> StoreResult<Conversation> {
        self.writes.lock().push(StoreWrite::Create);
        Self::check(&self.fail_create)?;
        self.inner.create_conversation(title).await
    }

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> StoreResult<bool> {
        self.inner.rename_conversation(id, title).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> StoreResult<bool> {
        Self::check(&self.fail_delete)?;
        self.inner.delete_conversation(id).await
    }

    async fn auto_title(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        self.auto_title_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.auto_title(id).await
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>> {
        Self::check(&self.fail_load)?;
        self.inner.list_messages(conversation_id).await
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
    ) -> StoreResult<Message> {
        self.writes.lock().push(StoreWrite::Append(role));
        Self::check(&self.fail_append)?;
        self.inner.append_message(conversation_id, role, content).await
    }

    async fn delete_message(&self, id: &MessageId) -> StoreResult<bool> {
        self.inner.delete_message(id).await
    }
}

/// A recorded inference request.
#[derive(Debug, Clone)]
pub(crate) struct InferenceCall {
    pub text: String,
    pub history: Vec<HistoryMessage>,
}

/// Inference fake that replays queued results and can hold replies back.
#[derive(Default)]
pub(crate) struct ScriptedInference {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Mutex<Vec<InferenceCall>>,
    gate: Option<Semaphore>,
}

impl ScriptedInference {
    /// Replies wait for `release` before returning.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, err: AiError) -> Self {
        self.replies.lock().push_back(Err(err));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<InferenceCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedInference {
    async fn chat(&self, text: &str, history: &[HistoryMessage]) -> Result<String, AiError> {
        self.calls.lock().push(InferenceCall {
            text: text.to_string(),
            history: history.to_vec(),
        });
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let next = self.replies.lock().pop_front();
        next.unwrap_or_else(|| Ok(format!("echo: {text}")))
    }
}

/// Voice output that remembers what it was asked to say.
#[derive(Default)]
pub(crate) struct RecordingVoice {
    spoken: Mutex<Vec<String>>,
}

impl RecordingVoice {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl VoiceOutput for RecordingVoice {
    fn speak(&self, text: &str, _settings: &VoiceSettings) {
        self.spoken.lock().push(text.to_string());
    }
}

pub(crate) struct Harness {
    pub store: Arc<FlakyStore>,
    pub inference: Arc<ScriptedInference>,
    pub events: Arc<EventBus>,
    pub session: Arc<SessionManager>,
}

pub(crate) fn harness(inference: ScriptedInference) -> Harness {
    harness_with(inference, SessionSettings::default())
}

pub(crate) fn harness_with(inference: ScriptedInference, settings: SessionSettings) -> Harness {
    let store = Arc::new(FlakyStore::default());
    let inference = Arc::new(inference);
    let events = Arc::new(EventBus::default());
    let session = Arc::new(
        SessionManager::new(store.clone(), inference.clone(), events.clone())
            .with_settings(settings),
    );
    Harness {
        store,
        inference,
        events,
        session,
    }
}

pub(crate) fn message(id: &str, role: Role, content: &str) -> Message {
    Message {
        id: MessageId::from(id),
        conversation_id: ConversationId::from("c1"),
        role,
        content: content.to_string(),
        created_at: chrono::Utc::now(),
    }
}
