//! # causerie-demo
//!
//! Two chat clients wired back-to-back over the in-process loopback
//! transport:
//! - Alice types a few keystrokes (throttled on the wire) and sends a message
//! - Bob sees the typing indicator, receives the message, and answers
//! - A final indicator is left to expire through the debounce window
//!
//! Run with `RUST_LOG=debug` to watch the event loops work.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use causerie_client::{
    ChatClient, ChatClientConfig, LocalBus, LocalChatService, SendMessageParams, SendTypingParams,
};
use causerie_model::{
    ChatMessage, Conversation, MessageContent, MessageDirection, Participant, Sender, User,
};
use causerie_store::ChatStorage;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const LOBBY: &str = "lobby";

fn build_storage() -> ChatStorage {
    ChatStorage::new(Box::new(|| Uuid::new_v4().to_string().into()))
        .with_message_id_generator(Box::new(|_| Uuid::new_v4().to_string().into()))
}

fn build_client(bus: &LocalBus, name: &str, peer: &str) -> ChatClient<LocalChatService> {
    let mut storage = build_storage();
    storage.set_current_user(User::new(name.into()).with_username(name));
    storage.add_user(User::new(peer.into()).with_username(peer));
    storage.add_conversation(
        Conversation::new(LOBBY.into())
            .with_description("Loopback lobby")
            .with_participants(vec![
                Participant::new(name.into()),
                Participant::new(peer.into()),
            ]),
    );
    ChatClient::new(storage, Arc::new(bus.service()), ChatClientConfig::default())
}

fn text(sender: &str, body: &str) -> ChatMessage {
    ChatMessage::new(
        Sender::user(sender.into()),
        MessageDirection::Outgoing,
        MessageContent::text(body),
    )
}

/// Blocks until `ready` holds, re-checking on every state change.
async fn wait_until<F>(changes: &mut watch::Receiver<u64>, mut ready: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    while !ready() {
        changes.changed().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,causerie_client=debug")),
        )
        .init();

    info!("Starting causerie loopback demo v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Two clients on one bus
    // -----------------------------------------------------------------------
    let bus = LocalBus::new();
    let alice = build_client(&bus, "alice", "bob");
    let bob = build_client(&bus, "bob", "alice");

    alice.set_active_conversation(Some(&LOBBY.into()));
    let mut bob_changes = bob.changes();
    let mut alice_changes = alice.changes();

    // -----------------------------------------------------------------------
    // 3. Alice types, then sends
    // -----------------------------------------------------------------------
    for preview in ["he", "hell", "hello bo"] {
        alice.send_typing(SendTypingParams {
            content: preview.into(),
            ..Default::default()
        });
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    wait_until(&mut bob_changes, || {
        bob.get_conversation(&LOBBY.into())
            .map(|c| !c.typing_users.is_empty())
            .unwrap_or(false)
    })
    .await?;
    let typing: Vec<String> = bob
        .get_conversation(&LOBBY.into())
        .map(|c| c.typing_users.iter().map(|t| t.user_id.to_string()).collect())
        .unwrap_or_default();
    info!(?typing, "Bob sees who is typing");

    alice.send_message(SendMessageParams::new(text("alice", "hello bob"), LOBBY.into()))?;

    wait_until(&mut bob_changes, || !bob.state().messages.is_empty()).await?;
    let unread = bob
        .get_conversation(&LOBBY.into())
        .map(|c| c.unread_counter)
        .unwrap_or_default();
    info!(unread, "Message delivered to Bob");

    // -----------------------------------------------------------------------
    // 4. Bob opens the lobby and answers
    // -----------------------------------------------------------------------
    bob.set_active_conversation(Some(&LOBBY.into()));
    bob.send_message(SendMessageParams::new(text("bob", "hey alice"), LOBBY.into()))?;

    wait_until(&mut alice_changes, || {
        alice.conversation_messages(&LOBBY.into()).len() == 2
    })
    .await?;

    for group in alice.conversation_messages(&LOBBY.into()) {
        for message in &group.messages {
            let body = match &message.content {
                MessageContent::TextPlain { text } => text.clone(),
                other => format!("{other:?}"),
            };
            info!(
                from = %group.sender_id,
                direction = ?message.direction,
                body,
                "Alice's view"
            );
        }
    }

    // -----------------------------------------------------------------------
    // 5. Let a typing indicator expire through the debounce window
    // -----------------------------------------------------------------------
    alice.send_typing(SendTypingParams {
        content: "actually".into(),
        ..Default::default()
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let before = bob
        .get_conversation(&LOBBY.into())
        .map(|c| c.typing_users.len())
        .unwrap_or_default();

    tokio::time::sleep(bob.config().typing_debounce_time + Duration::from_millis(100)).await;
    let after = bob
        .get_conversation(&LOBBY.into())
        .map(|c| c.typing_users.len())
        .unwrap_or_default();
    info!(before, after, "Typing indicator expired on its own");

    let state = bob.state();
    info!(
        users = state.users.len(),
        conversations = state.conversations.len(),
        groups = state.current_messages.len(),
        "Bob's final state"
    );
    info!("Demo complete");

    Ok(())
}
