//! Conversations, their participants, and the per-conversation typing set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ConversationId, UserId};

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Free-form permission labels granted to a participant.  The engine treats
/// the set as opaque; meaning is assigned by the host application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConversationRole(pub Vec<String>);

/// Membership record.  Unique by `id` within one conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub role: ConversationRole,
}

impl Participant {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            role: ConversationRole::default(),
        }
    }

    pub fn with_role(mut self, role: ConversationRole) -> Self {
        self.role = role;
        self
    }
}

// ---------------------------------------------------------------------------
// Typing users
// ---------------------------------------------------------------------------

/// Ephemeral "user X is typing" record.  Lifetime is bounded by the typing
/// debounce window or an explicit clear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypingUser {
    pub user_id: UserId,
    /// Preview of what the user is typing; empty when the transport does not
    /// share it.
    pub content: String,
    pub is_typing: bool,
}

impl TypingUser {
    pub fn new(user_id: UserId, content: &str, is_typing: bool) -> Self {
        Self {
            user_id,
            content: content.to_string(),
            is_typing,
        }
    }
}

/// Set of typing users keyed by user id, at most one entry per user,
/// last write wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TypingUserList {
    items: Vec<TypingUser>,
}

impl TypingUserList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&TypingUser> {
        self.items.iter().find(|t| &t.user_id == user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypingUser> {
        self.items.iter()
    }

    /// Upsert by user id: replaces an existing entry for the same user,
    /// otherwise appends.
    pub fn add_user(&mut self, typing_user: TypingUser) {
        match self.items.iter().position(|t| t.user_id == typing_user.user_id) {
            Some(idx) => self.items[idx] = typing_user,
            None => self.items.push(typing_user),
        }
    }

    /// Remove the entry for `user_id`.  Returns `true` if one was removed.
    pub fn remove_user(&mut self, user_id: &UserId) -> bool {
        match self.items.iter().position(|t| &t.user_id == user_id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// An addressable thread of participants and grouped messages.  Identity is
/// the `id`, unique within the conversation collection.  Message groups live
/// in the store, keyed by this id, not on the conversation itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<Participant>,
    pub unread_counter: u32,
    pub typing_users: TypingUserList,
    /// Unsent input text cached while the conversation is not active.
    pub draft: String,
    pub description: String,
    pub readonly: bool,
    /// Arbitrary host-application data attached to the conversation.
    pub data: Option<Value>,
}

impl Conversation {
    /// Create an empty, writable conversation.
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            participants: Vec::new(),
            unread_counter: 0,
            typing_users: TypingUserList::new(),
            draft: String::new(),
            description: String::new(),
            readonly: false,
            data: None,
        }
    }

    pub fn with_participants(mut self, participants: Vec<Participant>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn participant_exists(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.id == user_id)
    }

    pub fn get_participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == user_id)
    }

    /// Add a participant if no entry for the same user exists yet.
    /// Returns `true` if the participant was added.
    pub fn add_participant(&mut self, participant: Participant) -> bool {
        if self.participant_exists(&participant.id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Remove the participant with `user_id`.  Returns `true` if one was
    /// removed.
    pub fn remove_participant(&mut self, user_id: &UserId) -> bool {
        match self.participants.iter().position(|p| &p.id == user_id) {
            Some(idx) => {
                self.participants.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn add_typing_user(&mut self, typing_user: TypingUser) {
        self.typing_users.add_user(typing_user);
    }

    pub fn remove_typing_user(&mut self, user_id: &UserId) -> bool {
        self.typing_users.remove_user(user_id)
    }
}
