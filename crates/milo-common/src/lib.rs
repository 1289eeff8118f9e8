//! Types shared by every MILO crate: ids, records, events and errors.

pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, MiloError};
pub use events::{Event, EventBus};
pub use id::{ConversationId, MessageId};
pub use types::{Conversation, Message, Role};

pub type Result<T> = std::result::Result<T, MiloError>;
