//! In-process loopback transport for demos and tests.
//!
//! A [`LocalBus`] connects any number of [`LocalChatService`] endpoints.
//! Everything one endpoint sends is delivered to every other endpoint as an
//! inbound event; an endpoint never hears its own sends.

use causerie_model::{ChatEvent, MessageDirection, MessageEvent, UserTypingEvent};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::service::{ChatService, SendMessageServiceParams, SendTypingServiceParams};

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct BusFrame {
    origin: Uuid,
    event: ChatEvent,
}

/// Shared bus connecting [`LocalChatService`] endpoints.
#[derive(Debug, Clone)]
pub struct LocalBus {
    tx: broadcast::Sender<BusFrame>,
}

impl LocalBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Creates a service endpoint attached to this bus.
    ///
    /// Must be called from within a tokio runtime.
    pub fn service(&self) -> LocalChatService {
        LocalChatService::attach(self.tx.clone())
    }

    /// Delivers `event` to every endpoint on the bus, as if it came from
    /// outside.  Useful for injecting presence or connection events.
    pub fn broadcast(&self, event: ChatEvent) {
        let _ = self.tx.send(BusFrame {
            origin: Uuid::nil(),
            event,
        });
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Loopback [`ChatService`] endpoint.
///
/// Messages delivered to other endpoints arrive with their direction
/// rewritten to [`MessageDirection::Incoming`], the way a remote peer would
/// see them.
pub struct LocalChatService {
    id: Uuid,
    bus_tx: broadcast::Sender<BusFrame>,
    events_tx: broadcast::Sender<ChatEvent>,
    forwarder: JoinHandle<()>,
}

impl LocalChatService {
    fn attach(bus_tx: broadcast::Sender<BusFrame>) -> Self {
        let id = Uuid::new_v4();
        let (events_tx, _rx) = broadcast::channel(BUS_CAPACITY);
        let mut bus_rx = bus_tx.subscribe();
        let forward_tx = events_tx.clone();

        let forwarder = tokio::spawn(async move {
            loop {
                match bus_rx.recv().await {
                    Ok(frame) => {
                        if frame.origin == id {
                            continue;
                        }
                        let _ = forward_tx.send(deliver(frame.event));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Loopback endpoint lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            id,
            bus_tx,
            events_tx,
            forwarder,
        }
    }

    fn publish(&self, event: ChatEvent) {
        if self
            .bus_tx
            .send(BusFrame {
                origin: self.id,
                event,
            })
            .is_err()
        {
            debug!("Loopback bus has no endpoints");
        }
    }
}

/// Rewrites an event the way the receiving side sees it.
fn deliver(event: ChatEvent) -> ChatEvent {
    match event {
        ChatEvent::Message(mut event) => {
            event.message.direction = MessageDirection::Incoming;
            ChatEvent::Message(event)
        }
        other => other,
    }
}

impl ChatService for LocalChatService {
    fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events_tx.subscribe()
    }

    fn send_message(&self, params: SendMessageServiceParams) {
        self.publish(ChatEvent::Message(MessageEvent {
            message: params.message,
            conversation_id: params.conversation_id,
        }));
    }

    fn send_typing(&self, params: SendTypingServiceParams) {
        self.publish(ChatEvent::UserTyping(UserTypingEvent {
            conversation_id: params.conversation_id,
            user_id: params.user_id,
            content: params.content,
            is_typing: params.is_typing,
        }));
    }
}

impl Drop for LocalChatService {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
