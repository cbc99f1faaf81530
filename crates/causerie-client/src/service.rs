//! The transport seam between the client and whatever carries messages.

use causerie_model::{ChatEvent, ChatMessage, ConversationId, UserId};
use tokio::sync::broadcast;

/// Outbound message handed to a transport.  The message has already been
/// stored locally and carries its final id.
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageServiceParams {
    pub message: ChatMessage,
    pub conversation_id: ConversationId,
}

/// Outbound typing signal handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTypingServiceParams {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub content: String,
    pub is_typing: bool,
}

/// A chat transport.
///
/// Implementations deliver remote activity as [`ChatEvent`]s on the channel
/// returned by [`subscribe`](Self::subscribe) and accept outbound sends.
/// Sends are fire-and-forget and must not block; implementations queue
/// internally and surface delivery failures as events of their own.
pub trait ChatService: Send + Sync + 'static {
    /// Opens a fresh event subscription.  Every subscriber sees every event
    /// published after the call.
    fn subscribe(&self) -> broadcast::Receiver<ChatEvent>;

    /// Transmits an already-stored message.
    fn send_message(&self, params: SendMessageServiceParams);

    /// Transmits a typing signal.
    fn send_typing(&self, params: SendTypingServiceParams);
}
