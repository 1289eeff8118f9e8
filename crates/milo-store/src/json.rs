use std::path::{Path, PathBuf};

use async_trait::async_trait;
use milo_common::{Conversation, ConversationId, Message, MessageId, Role};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::state::StoreState;
use crate::{PersistenceGateway, StoreError, StoreResult, DEFAULT_PLACEHOLDER_TITLE};

/// Conversation store backed by a single JSON file.
///
/// The whole state is rewritten after every mutation through a temp file
/// and a rename, so a crash never leaves a half-written file behind.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
    placeholder_title: String,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                StoreError::InvalidData(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no conversation file at {}, starting empty", path.display());
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
            placeholder_title: DEFAULT_PLACEHOLDER_TITLE.to_string(),
        })
    }

    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = title.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state and keep it only once it is
    /// on disk. The closure reports whether anything changed.
    async fn commit<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreState) -> StoreResult<(T, bool)> + Send,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let (outcome, changed) = change(&mut next)?;
        if changed {
            self.persist(&next).await?;
            *state = next;
        }
        Ok(outcome)
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::InvalidData(format!("failed to serialize store: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            conversations = state.conversations.len(),
            messages = state.messages.len(),
            "persisted conversation store"
        );
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileStore {
    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        Ok(self.state.lock().await.list_conversations())
    }

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        Ok(self.state.lock().await.get_conversation(id))
    }

    async fn create_conversation(&self, title: Option<&str>) -> StoreResult<Conversation> {
        let title = title.unwrap_or(&self.placeholder_title);
        self.commit(|state| Ok((state.create_conversation(title), true)))
            .await
    }

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> StoreResult<bool> {
        self.commit(|state| {
            let renamed = state.rename_conversation(id, title);
            Ok((renamed, renamed))
        })
        .await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> StoreResult<bool> {
        self.commit(|state| {
            let deleted = state.delete_conversation(id);
            Ok((deleted, deleted))
        })
        .await
    }

    async fn auto_title(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        let placeholder = self.placeholder_title.as_str();
        self.commit(|state| {
            let titled = state.auto_title(id, placeholder)?;
            let changed = titled.is_some();
            Ok((titled, changed))
        })
        .await
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>> {
        Ok(self.state.lock().await.list_messages(conversation_id))
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
    ) -> StoreResult<Message> {
        self.commit(|state| Ok((state.append_message(conversation_id, role, content)?, true)))
            .await
    }

    async fn delete_message(&self, id: &MessageId) -> StoreResult<bool> {
        self.commit(|state| {
            let deleted = state.delete_message(id);
            Ok((deleted, deleted))
        })
        .await
    }
}
