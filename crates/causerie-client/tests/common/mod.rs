#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use causerie_client::{ChatService, SendMessageServiceParams, SendTypingServiceParams};
use causerie_model::{ChatEvent, ChatMessage, MessageContent, MessageDirection, Sender};
use causerie_store::ChatStorage;
use tokio::sync::broadcast;

/// Storage with a deterministic group id sequence (g0, g1, ...).
pub fn storage() -> ChatStorage {
    let counter = Arc::new(AtomicU64::new(0));
    ChatStorage::new(Box::new(move || {
        format!("g{}", counter.fetch_add(1, Ordering::Relaxed)).into()
    }))
}

pub fn text_message(sender: &str, text: &str) -> ChatMessage {
    ChatMessage::new(
        Sender::user(sender.into()),
        MessageDirection::Outgoing,
        MessageContent::text(text),
    )
}

/// Transport that records outbound calls and lets tests inject inbound
/// events.
pub struct RecordingService {
    messages: Mutex<Vec<SendMessageServiceParams>>,
    typing: Mutex<Vec<SendTypingServiceParams>>,
    events: broadcast::Sender<ChatEvent>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
            events: broadcast::channel(16).0,
        }
    }

    /// Delivers `event` to the client under test.
    pub fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }

    pub fn sent_messages(&self) -> Vec<SendMessageServiceParams> {
        self.messages.lock().unwrap().clone()
    }

    pub fn sent_typing(&self) -> Vec<SendTypingServiceParams> {
        self.typing.lock().unwrap().clone()
    }
}

impl ChatService for RecordingService {
    fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    fn send_message(&self, params: SendMessageServiceParams) {
        self.messages.lock().unwrap().push(params);
    }

    fn send_typing(&self, params: SendTypingServiceParams) {
        self.typing.lock().unwrap().push(params);
    }
}
