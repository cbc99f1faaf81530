use serde::{Deserialize, Serialize};

use crate::enums::ConnectionState;
use crate::ids::{ConversationId, UserId};
use crate::message::ChatMessage;
use crate::user::Presence;

// Events delivered by a transport service to the client event loop.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEvent {
    pub message: ChatMessage,
    pub conversation_id: ConversationId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserTypingEvent {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    /// Preview of the text being typed; may be empty.
    pub content: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPresenceChangedEvent {
    pub user_id: UserId,
    pub presence: Presence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionStateChangedEvent {
    pub state: ConnectionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserConnectedEvent {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDisconnectedEvent {
    pub user_id: UserId,
}

/// Everything a transport service can deliver to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ChatEvent {
    Message(MessageEvent),
    UserTyping(UserTypingEvent),
    UserPresenceChanged(UserPresenceChangedEvent),
    ConnectionStateChanged(ConnectionStateChangedEvent),
    UserConnected(UserConnectedEvent),
    UserDisconnected(UserDisconnectedEvent),
}
