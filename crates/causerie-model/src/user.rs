//! User identity and presence.
//!
//! Every struct derives `Serialize` and `Deserialize` so snapshots can be
//! handed directly to the UI layer over IPC.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::UserStatus;
use crate::ids::UserId;

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// A user's availability.  Owned by exactly one [`User`] and replaced
/// wholesale on update, never patched field by field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Presence {
    pub status: UserStatus,
    /// Free-form status line ("in a meeting", "on vacation", ...).
    pub description: String,
}

impl Presence {
    pub fn new(status: UserStatus) -> Self {
        Self {
            status,
            description: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A known user.  Identity is the `id`, unique within the user collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub presence: Presence,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// Avatar URL; empty when the user has none.
    pub avatar: String,
    pub bio: String,
    /// Arbitrary host-application data attached to the user.
    pub data: Option<Value>,
}

impl User {
    /// Create a user with empty profile fields and unknown presence.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            presence: Presence::default(),
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            email: String::new(),
            avatar: String::new(),
            bio: String::new(),
            data: None,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}
