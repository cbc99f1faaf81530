//! Messages, their content union, and the per-conversation message groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{MessageContentType, MessageDirection, MessageStatus, SenderType, SystemMessageType};
use crate::ids::{GroupId, MessageId, UserId};

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Who authored a message.  The `id` half is what the grouping engine keys
/// on; the `kind` half is informational.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub kind: SenderType,
}

impl Sender {
    pub fn new(id: UserId, kind: SenderType) -> Self {
        Self { id, kind }
    }

    /// A plain human sender, the common case.
    pub fn user(id: UserId) -> Self {
        Self::new(id, SenderType::User)
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// One item of a [`MessageContent::Gallery`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GalleryItem {
    pub src: String,
    pub description: String,
}

/// One item of a [`MessageContent::AttachmentList`].  When `url` is empty
/// the attachment is carried inline in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentItem {
    pub url: String,
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Message payload, tagged by content type.  Each variant corresponds to one
/// [`MessageContentType`] discriminant; the pairing is enforced by
/// construction rather than checked at runtime.  Host applications extend
/// the union through [`MessageContent::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    TextPlain {
        text: String,
    },
    TextMarkdown {
        text: String,
    },
    TextHtml {
        text: String,
    },
    Image {
        url: String,
        #[serde(default)]
        data: Vec<u8>,
    },
    Gallery {
        items: Vec<GalleryItem>,
    },
    Kml {
        text: String,
    },
    Attachment {
        url: String,
        #[serde(default)]
        data: Vec<u8>,
    },
    AttachmentList {
        items: Vec<AttachmentItem>,
    },
    Video {
        url: String,
        #[serde(default)]
        data: Vec<u8>,
    },
    VCard {
        data: Value,
    },
    ICalendar {
        text: String,
    },
    System {
        kind: SystemMessageType,
        text: String,
    },
    Other {
        data: Value,
    },
}

impl MessageContent {
    /// Convenience constructor for the most common payload.
    pub fn text(text: &str) -> Self {
        Self::TextPlain {
            text: text.to_string(),
        }
    }

    /// The integer-discriminated type tag of this payload.
    pub fn content_type(&self) -> MessageContentType {
        match self {
            Self::TextPlain { .. } => MessageContentType::TextPlain,
            Self::TextMarkdown { .. } => MessageContentType::TextMarkdown,
            Self::TextHtml { .. } => MessageContentType::TextHtml,
            Self::Image { .. } => MessageContentType::Image,
            Self::Gallery { .. } => MessageContentType::Gallery,
            Self::Kml { .. } => MessageContentType::Kml,
            Self::Attachment { .. } => MessageContentType::Attachment,
            Self::AttachmentList { .. } => MessageContentType::AttachmentList,
            Self::Video { .. } => MessageContentType::Video,
            Self::VCard { .. } => MessageContentType::VCard,
            Self::ICalendar { .. } => MessageContentType::ICalendar,
            Self::System { .. } => MessageContentType::System,
            Self::Other { .. } => MessageContentType::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A single chat message.  Identity is the `id` once assigned; a message may
/// be created with the empty default id and receive one from the store when
/// added with `generate_id` set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub status: MessageStatus,
    pub sender: Sender,
    pub direction: MessageDirection,
    pub content: MessageContent,
    pub created_time: DateTime<Utc>,
    pub updated_time: Option<DateTime<Utc>>,
    /// Arbitrary host-application data attached to the message.
    pub data: Option<Value>,
}

impl ChatMessage {
    /// Create an id-less `Pending` message timestamped now.
    pub fn new(sender: Sender, direction: MessageDirection, content: MessageContent) -> Self {
        Self {
            id: MessageId::default(),
            status: MessageStatus::Pending,
            sender,
            direction,
            content,
            created_time: Utc::now(),
            updated_time: None,
            data: None,
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    /// Sender id as used by the grouping engine.
    pub fn sender_id(&self) -> &UserId {
        &self.sender.id
    }

    pub fn content_type(&self) -> MessageContentType {
        self.content.content_type()
    }
}

// ---------------------------------------------------------------------------
// MessageGroup
// ---------------------------------------------------------------------------

/// A run of consecutive messages from one sender within a conversation.
/// Groups are created by the store and ordered chronologically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageGroup {
    pub id: GroupId,
    pub sender_id: UserId,
    pub direction: MessageDirection,
    pub messages: Vec<ChatMessage>,
}

impl MessageGroup {
    /// Create an empty group.  `sender_id` and `direction` are copied from
    /// the message that opens the run.
    pub fn new(id: GroupId, sender_id: UserId, direction: MessageDirection) -> Self {
        Self {
            id,
            sender_id,
            direction,
            messages: Vec::new(),
        }
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn get_message(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Replace the message with a matching id in place.  Returns `true` if a
    /// message was replaced.
    pub fn replace_message(&mut self, message: &ChatMessage) -> bool {
        match self.messages.iter().position(|m| m.id == message.id) {
            Some(idx) => {
                self.messages[idx] = message.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(id: &str, sender: &str) -> ChatMessage {
        ChatMessage::new(
            Sender::user(UserId::from(sender)),
            MessageDirection::Outgoing,
            MessageContent::text("hello"),
        )
        .with_id(MessageId::from(id))
    }

    #[test]
    fn test_replace_message_swaps_matching_id_only() {
        let mut group = MessageGroup::new(
            GroupId::from("g1"),
            UserId::from("u1"),
            MessageDirection::Outgoing,
        );
        group.add_message(text_message("m1", "u1"));
        group.add_message(text_message("m2", "u1"));

        let updated = text_message("m2", "u1").with_status(MessageStatus::Seen);
        assert!(group.replace_message(&updated));
        assert_eq!(group.messages[1].status, MessageStatus::Seen);
        assert_eq!(group.messages[0].status, MessageStatus::Pending);

        let unknown = text_message("m9", "u1");
        assert!(!group.replace_message(&unknown));
        assert_eq!(group.messages.len(), 2);
    }

    #[test]
    fn test_content_tag_serialization() {
        let content = MessageContent::System {
            kind: SystemMessageType::UserJoined,
            text: "u1 joined".to_string(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(content.content_type(), MessageContentType::System);
    }
}
