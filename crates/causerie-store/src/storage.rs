//! The storage aggregate: owned collections, cursors, and id generators.
//!
//! [`ChatStorage`] is the single owner of all chat state.  It is not safe
//! for concurrent mutation on its own; callers that share it across tasks
//! wrap it in `Arc<Mutex<_>>` (see `causerie-client`) and keep critical
//! sections synchronous.

use std::collections::HashMap;
use std::fmt;

use causerie_model::{ChatMessage, Conversation, ConversationId, GroupId, MessageGroup, MessageId, User};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::state::ChatState;

/// Produces ids for new message groups.
pub type GroupIdGenerator = Box<dyn Fn() -> GroupId + Send + Sync>;

/// Produces ids for messages added with `generate_id` set.  Expected to be
/// a pure function of the message's observable fields.
pub type MessageIdGenerator = Box<dyn Fn(&ChatMessage) -> MessageId + Send + Sync>;

/// In-memory chat state engine.
///
/// Owns the user and conversation collections, the grouped-message map, and
/// the three cursors: current user, active conversation, and the shared
/// message input text.  All mutation goes through methods; every lookup
/// reports absence through `Option` or `bool` rather than an error.
pub struct ChatStorage {
    pub(crate) group_id_generator: GroupIdGenerator,
    pub(crate) message_id_generator: Option<MessageIdGenerator>,
    pub(crate) current_user: Option<User>,
    pub(crate) users: Vec<User>,
    pub(crate) conversations: Vec<Conversation>,
    pub(crate) active_conversation_id: Option<ConversationId>,
    pub(crate) messages: HashMap<ConversationId, Vec<MessageGroup>>,
    pub(crate) current_message: String,
}

impl ChatStorage {
    /// Create an empty storage.  The group id generator is mandatory; a
    /// message id generator is attached separately with
    /// [`with_message_id_generator`](Self::with_message_id_generator).
    pub fn new(group_id_generator: GroupIdGenerator) -> Self {
        Self {
            group_id_generator,
            message_id_generator: None,
            current_user: None,
            users: Vec::new(),
            conversations: Vec::new(),
            active_conversation_id: None,
            messages: HashMap::new(),
            current_message: String::new(),
        }
    }

    pub fn with_message_id_generator(mut self, generator: MessageIdGenerator) -> Self {
        self.message_id_generator = Some(generator);
        self
    }

    /// Whether messages can be added with `generate_id` set.
    pub fn has_message_id_generator(&self) -> bool {
        self.message_id_generator.is_some()
    }

    pub(crate) fn generate_message_id(&self, message: &ChatMessage) -> Result<MessageId> {
        match self.message_id_generator.as_ref() {
            Some(generator) => Ok(generator(message)),
            None => Err(StoreError::IdGeneratorNotDefined),
        }
    }

    pub(crate) fn next_group_id(&self) -> GroupId {
        (self.group_id_generator)()
    }

    // ------------------------------------------------------------------
    // Cursors
    // ------------------------------------------------------------------

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn set_current_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    pub fn current_message(&self) -> &str {
        &self.current_message
    }

    /// Set the text of the shared message input.
    pub fn set_current_message(&mut self, text: &str) {
        self.current_message = text.to_string();
    }

    pub fn active_conversation_id(&self) -> Option<&ConversationId> {
        self.active_conversation_id.as_ref()
    }

    pub fn get_active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .as_ref()
            .and_then(|id| self.conversations.iter().find(|c| &c.id == id))
    }

    /// Point the active-conversation cursor at `id` (or nowhere).  When the
    /// target exists and `reset_unread_counter` is set, its unread counter
    /// is zeroed.
    pub fn set_active_conversation(&mut self, id: Option<ConversationId>, reset_unread_counter: bool) {
        if reset_unread_counter {
            if let Some(id) = id.as_ref() {
                if let Some(conversation) = self.get_conversation_mut(id) {
                    conversation.unread_counter = 0;
                }
            }
        }
        self.active_conversation_id = id;
    }

    /// Write `text` into the active conversation's draft.  No-op when no
    /// conversation is active.
    pub fn set_draft(&mut self, text: &str) {
        if let Some(id) = self.active_conversation_id.clone() {
            if let Some(conversation) = self.get_conversation_mut(&id) {
                conversation.draft = text.to_string();
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshot / teardown
    // ------------------------------------------------------------------

    /// Produce an owned snapshot of the full state.  `current_messages` is
    /// derived from the active conversation's group sequence.
    pub fn get_state(&self) -> ChatState {
        let active_conversation = self.get_active_conversation().cloned();
        let current_messages = self
            .active_conversation_id
            .as_ref()
            .map(|id| self.conversation_messages(id).to_vec())
            .unwrap_or_default();

        ChatState {
            current_user: self.current_user.clone(),
            users: self.users.clone(),
            conversations: self.conversations.clone(),
            active_conversation,
            current_messages,
            messages: self.messages.clone(),
            current_message: self.current_message.clone(),
        }
    }

    /// Tear down to initial values: current user, users, conversations,
    /// active-conversation cursor, and all message groups.  The message
    /// input text is not part of the teardown set and survives.
    pub fn reset_state(&mut self) {
        debug!("Chat storage reset");
        self.current_user = None;
        self.users.clear();
        self.conversations.clear();
        self.active_conversation_id = None;
        self.messages.clear();
    }

    /// No-op.  The real teardown lives in [`reset_state`](Self::reset_state);
    /// this hook keeps its own, empty effect.
    pub fn clear_state(&mut self) {}
}

impl fmt::Debug for ChatStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStorage")
            .field("user_count", &self.users.len())
            .field("conversation_count", &self.conversations.len())
            .field("active_conversation_id", &self.active_conversation_id)
            .field("current_message_len", &self.current_message.len())
            .finish_non_exhaustive()
    }
}
