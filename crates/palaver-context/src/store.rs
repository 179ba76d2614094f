//! Message store collaborator.
//!
//! Persistence is owned elsewhere in the platform; the context subsystem
//! only needs ordered message reads. The trait is async because real
//! implementations sit on a database or RPC boundary.

use async_trait::async_trait;

use palaver_core::errors::StoreError;
use palaver_core::ids::ConversationId;
use palaver_core::messages::ChatMessage;

/// Read access to persisted conversation messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch all messages of a conversation, oldest first.
    async fn get_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<ChatMessage>, StoreError>;
}

/// In-memory message store.
///
/// Backs tests and single-process deployments. Messages are kept per
/// conversation in insertion order.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: dashmap::DashMap<ConversationId, Vec<ChatMessage>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a conversation.
    pub fn push(&self, conversation: &ConversationId, message: ChatMessage) {
        self.messages
            .entry(conversation.clone())
            .or_default()
            .push(message);
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn get_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self
            .messages
            .get(conversation)
            .map(|m| m.value().clone())
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
