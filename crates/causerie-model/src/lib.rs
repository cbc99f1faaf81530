//! # causerie-model
//!
//! Value objects shared by every layer of the causerie chat engine: ids,
//! enumerations, users and presence, conversations with their participant
//! and typing sets, messages with their grouped runs, and the event types
//! crossing the transport boundary.
//!
//! Everything here is plain data.  Mutation policy (who may change what,
//! and when the UI is told about it) lives in `causerie-store` and
//! `causerie-client`.

pub mod conversation;
pub mod enums;
pub mod events;
pub mod ids;
pub mod message;
pub mod user;

pub use conversation::{Conversation, ConversationRole, Participant, TypingUser, TypingUserList};
pub use enums::*;
pub use events::*;
pub use ids::{ConversationId, GroupId, MessageId, UserId};
pub use message::{AttachmentItem, ChatMessage, GalleryItem, MessageContent, MessageGroup, Sender};
pub use user::{Presence, User};
