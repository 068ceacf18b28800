//! Chat message capability objects.

use super::{Field, Person};
use crate::error::AdapterError;
use async_trait::async_trait;

/// One message exchanged with a contact on a messaging-capable site.
#[derive(Debug, Clone, Default)]
pub struct ChatMessage {
    pub id: String,
    pub backend: String,

    /// Id of the contact on the other end.
    pub contact: Field<String>,

    pub content: Field<String>,

    /// Timestamp as reported by the site.
    pub date: Field<String>,

    /// True when the logged-in user sent the message.
    pub outgoing: Field<bool>,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend: backend.into(),
            ..Self::default()
        }
    }

    pub fn full_id(&self) -> String {
        super::full_id(&self.id, &self.backend)
    }
}

/// Capability trait for chat-capable backends.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Lists the logged-in user's contacts as partial person objects.
    async fn iter_contacts(&self) -> Result<Vec<Person>, AdapterError>;

    /// Lists messages exchanged with one contact, newest first.
    async fn iter_messages(&self, contact_id: &str) -> Result<Vec<ChatMessage>, AdapterError>;
}
