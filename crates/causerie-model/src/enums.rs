//! Enumerations shared across the engine.  Every enum that crosses the
//! service boundary carries an explicit integer discriminant so external
//! protocols can map it without depending on variant order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageDirection {
    Incoming = 0,
    Outgoing = 1,
}

/// Delivery lifecycle of a message: `Pending` → `Sent` → `DeliveredToCloud`
/// → `DeliveredToDevice` → `Seen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageStatus {
    Pending = 0,
    Sent = 1,
    DeliveredToCloud = 2,
    DeliveredToDevice = 3,
    Seen = 4,
}

impl MessageStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Sent),
            2 => Some(Self::DeliveredToCloud),
            3 => Some(Self::DeliveredToDevice),
            4 => Some(Self::Seen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::DeliveredToCloud => "delivered to cloud",
            Self::DeliveredToDevice => "delivered to device",
            Self::Seen => "seen",
        }
    }
}

/// What kind of actor authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SenderType {
    User = 0,
    Bot = 1,
    Channel = 2,
    Queue = 3,
    System = 4,
    Custom = 255,
}

impl SenderType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::User),
            1 => Some(Self::Bot),
            2 => Some(Self::Channel),
            3 => Some(Self::Queue),
            4 => Some(Self::System),
            255 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Discriminants for the [`crate::message::MessageContent`] union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageContentType {
    TextPlain = 0,
    TextMarkdown = 1,
    TextHtml = 2,
    Image = 3,
    Gallery = 4,
    Kml = 5,
    Attachment = 6,
    AttachmentList = 7,
    Video = 8,
    VCard = 9,
    ICalendar = 10,
    System = 11,
    Other = 255,
}

impl MessageContentType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::TextPlain),
            1 => Some(Self::TextMarkdown),
            2 => Some(Self::TextHtml),
            3 => Some(Self::Image),
            4 => Some(Self::Gallery),
            5 => Some(Self::Kml),
            6 => Some(Self::Attachment),
            7 => Some(Self::AttachmentList),
            8 => Some(Self::Video),
            9 => Some(Self::VCard),
            10 => Some(Self::ICalendar),
            11 => Some(Self::System),
            255 => Some(Self::Other),
            _ => None,
        }
    }
}

/// Sub-kind of a system message (joins, leaves, plain content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SystemMessageType {
    Content = 0,
    UserJoined = 1,
    UserLeft = 2,
    AdvisorJoined = 3,
    AdvisorLeft = 4,
    CustomerJoined = 5,
    CustomerLeft = 6,
}

impl SystemMessageType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Content),
            1 => Some(Self::UserJoined),
            2 => Some(Self::UserLeft),
            3 => Some(Self::AdvisorJoined),
            4 => Some(Self::AdvisorLeft),
            5 => Some(Self::CustomerJoined),
            6 => Some(Self::CustomerLeft),
            _ => None,
        }
    }
}

/// Availability component of a user's [`crate::user::Presence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum UserStatus {
    Unknown = 0,
    Available = 1,
    Unavailable = 2,
    Away = 3,
    Dnd = 4,
    Invisible = 5,
}

impl UserStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Available),
            2 => Some(Self::Unavailable),
            3 => Some(Self::Away),
            4 => Some(Self::Dnd),
            5 => Some(Self::Invisible),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Away => "away",
            Self::Dnd => "do not disturb",
            Self::Invisible => "invisible",
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Transport connection state reported by a service implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}
