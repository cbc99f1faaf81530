//! The read-only snapshot handed to the UI layer.

use std::collections::HashMap;

use causerie_model::{Conversation, ConversationId, MessageGroup, User};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of everything the UI renders.
///
/// Snapshots are owned clones: the engine behind a lock may mutate at any
/// moment after this is produced, so consumers re-fetch on the next change
/// notification instead of caching a snapshot across mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatState {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub conversations: Vec<Conversation>,
    /// The conversation currently focused in the UI, if any.
    pub active_conversation: Option<Conversation>,
    /// Message groups of the active conversation; empty when none is active.
    pub current_messages: Vec<MessageGroup>,
    /// Full grouped-message map, keyed by conversation.
    pub messages: HashMap<ConversationId, Vec<MessageGroup>>,
    /// Text sitting in the shared message input.
    pub current_message: String,
}
