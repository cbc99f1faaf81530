//! The consumer-facing chat client.
//!
//! [`ChatClient`] owns a [`ChatStorage`] behind a mutex, forwards outbound
//! activity to a [`ChatService`], and applies inbound service events to the
//! storage from a background loop.  After every mutation it bumps a change
//! counter; consumers watch the counter and re-read [`ChatClient::state`].

use std::sync::{Arc, Mutex};

use causerie_model::{
    ChatEvent, ChatMessage, Conversation, ConversationId, MessageEvent, MessageGroup, Participant,
    TypingUser, User, UserId, UserTypingEvent,
};
use causerie_store::{ChatState, ChatStorage, StoreError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{AutoDraft, ChatClientConfig};
use crate::lock;
use crate::notify::ChangeNotifier;
use crate::service::{ChatService, SendMessageServiceParams, SendTypingServiceParams};
use crate::typing::{TypingDebouncer, TypingThrottle};

// ---------------------------------------------------------------------------
// Send parameters
// ---------------------------------------------------------------------------

/// Parameters for [`ChatClient::send_message`].
#[derive(Debug, Clone)]
pub struct SendMessageParams {
    pub message: ChatMessage,
    pub conversation_id: ConversationId,
    /// Whether the store should mint a fresh message id.  `None` means
    /// "whenever a message id generator is configured".
    pub generate_id: Option<bool>,
    /// Clear the shared message input after the message is stored.
    pub clear_message_input: bool,
}

impl SendMessageParams {
    pub fn new(message: ChatMessage, conversation_id: ConversationId) -> Self {
        Self {
            message,
            conversation_id,
            generate_id: None,
            clear_message_input: true,
        }
    }
}

/// Parameters for [`ChatClient::send_typing`].
#[derive(Debug, Clone)]
pub struct SendTypingParams {
    /// Preview text to share with the other side; may be empty.
    pub content: String,
    pub is_typing: bool,
    /// Route the signal through the outbound throttle window.
    pub throttle: bool,
}

impl Default for SendTypingParams {
    fn default() -> Self {
        Self {
            content: String::new(),
            is_typing: true,
            throttle: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle to a running chat client.  Cloning is cheap and every clone talks
/// to the same storage and service.
pub struct ChatClient<S: ChatService> {
    inner: Arc<ClientInner<S>>,
}

impl<S: ChatService> Clone for ChatClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct ClientInner<S: ChatService> {
    storage: Arc<Mutex<ChatStorage>>,
    service: Arc<S>,
    config: ChatClientConfig,
    notifier: ChangeNotifier,
    debouncer: TypingDebouncer,
    throttle: TypingThrottle<S>,
    event_loop: JoinHandle<()>,
}

impl<S: ChatService> Drop for ClientInner<S> {
    fn drop(&mut self) {
        self.event_loop.abort();
        self.debouncer.cancel_pending();
    }
}

impl<S: ChatService> ChatClient<S> {
    /// Wires `storage` to `service` and spawns the inbound event loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(storage: ChatStorage, service: Arc<S>, config: ChatClientConfig) -> Self {
        let storage = Arc::new(Mutex::new(storage));
        let notifier = ChangeNotifier::new();
        let debouncer = TypingDebouncer::new(
            config.typing_debounce_time,
            storage.clone(),
            notifier.clone(),
        );
        let throttle = TypingThrottle::new(config.typing_throttle_time, service.clone());

        let event_loop = tokio::spawn(event_loop(
            service.subscribe(),
            storage.clone(),
            notifier.clone(),
            debouncer.clone(),
            config.debounce_typing,
        ));

        Self {
            inner: Arc::new(ClientInner {
                storage,
                service,
                config,
                notifier,
                debouncer,
                throttle,
                event_loop,
            }),
        }
    }

    /// Snapshot of the full state.
    pub fn state(&self) -> ChatState {
        lock(&self.inner.storage).get_state()
    }

    /// Receiver that moves whenever the state changed and should be re-read.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.notifier.subscribe()
    }

    pub fn service(&self) -> &Arc<S> {
        &self.inner.service
    }

    pub fn config(&self) -> &ChatClientConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn set_current_user(&self, user: User) {
        lock(&self.inner.storage).set_current_user(user);
        self.inner.notifier.notify();
    }

    pub fn add_user(&self, user: User) -> bool {
        let added = lock(&self.inner.storage).add_user(user);
        self.inner.notifier.notify();
        added
    }

    pub fn remove_user(&self, user_id: &UserId) -> bool {
        let removed = lock(&self.inner.storage).remove_user(user_id);
        self.inner.notifier.notify();
        removed
    }

    pub fn get_user(&self, user_id: &UserId) -> Option<User> {
        lock(&self.inner.storage).get_user(user_id).cloned()
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    pub fn add_conversation(&self, conversation: Conversation) -> bool {
        let added = lock(&self.inner.storage).add_conversation(conversation);
        self.inner.notifier.notify();
        added
    }

    pub fn get_conversation(&self, conversation_id: &ConversationId) -> Option<Conversation> {
        lock(&self.inner.storage).get_conversation(conversation_id).cloned()
    }

    pub fn update_conversation(&self, conversation: Conversation) -> bool {
        let updated = lock(&self.inner.storage).update_conversation(conversation);
        self.inner.notifier.notify();
        updated
    }

    pub fn remove_conversation(&self, conversation_id: &ConversationId, remove_messages: bool) -> bool {
        let removed = lock(&self.inner.storage).remove_conversation(conversation_id, remove_messages);
        self.inner.notifier.notify();
        removed
    }

    pub fn add_participant(&self, conversation_id: &ConversationId, participant: Participant) -> bool {
        let added = lock(&self.inner.storage).add_participant(conversation_id, participant);
        self.inner.notifier.notify();
        added
    }

    pub fn remove_participant(&self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        let removed = lock(&self.inner.storage).remove_participant(conversation_id, user_id);
        self.inner.notifier.notify();
        removed
    }

    pub fn set_unread(&self, conversation_id: &ConversationId, count: u32) {
        lock(&self.inner.storage).set_unread(conversation_id, count);
        self.inner.notifier.notify();
    }

    /// Focuses `conversation_id` (or clears the focus for `None`), applying
    /// the configured auto-draft policy and resetting the target's unread
    /// counter.
    pub fn set_active_conversation(&self, conversation_id: Option<&ConversationId>) {
        self.set_active_conversation_with_draft(conversation_id, self.inner.config.auto_draft);
    }

    /// Same as [`set_active_conversation`](Self::set_active_conversation)
    /// with an explicit draft policy.
    pub fn set_active_conversation_with_draft(
        &self,
        conversation_id: Option<&ConversationId>,
        auto_draft: AutoDraft,
    ) {
        {
            let mut guard = lock(&self.inner.storage);

            if auto_draft.saves() && guard.active_conversation_id().is_some() {
                let text = guard.current_message().to_string();
                guard.set_draft(&text);
            }

            guard.set_active_conversation(conversation_id.cloned(), true);

            // Unknown targets get the cursor but no restore; the input is
            // only touched when the entered conversation exists.
            if conversation_id.is_some() && auto_draft.restores() {
                if let Some(draft) = guard.get_active_conversation().map(|c| c.draft.clone()) {
                    if draft.is_empty() {
                        guard.set_current_message("");
                    } else {
                        guard.set_current_message(&draft);
                        guard.set_draft("");
                    }
                }
            }
        }
        self.inner.notifier.notify();
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Stores a message locally and hands it to the service for delivery.
    /// Returns the stored message, with its final id filled in.
    pub fn send_message(&self, params: SendMessageParams) -> Result<ChatMessage, StoreError> {
        let SendMessageParams {
            message,
            conversation_id,
            generate_id,
            clear_message_input,
        } = params;

        let stored = {
            let mut guard = lock(&self.inner.storage);
            let generate_id = generate_id.unwrap_or_else(|| guard.has_message_id_generator());
            let stored = guard.add_message(message, &conversation_id, generate_id)?;
            if clear_message_input {
                guard.set_current_message("");
            }
            stored
        };
        self.inner.notifier.notify();

        self.inner.service.send_message(SendMessageServiceParams {
            message: stored.clone(),
            conversation_id,
        });

        Ok(stored)
    }

    /// Stores a message without involving the service.
    pub fn add_message(
        &self,
        message: ChatMessage,
        conversation_id: &ConversationId,
        generate_id: bool,
    ) -> Result<ChatMessage, StoreError> {
        let stored = lock(&self.inner.storage).add_message(message, conversation_id, generate_id)?;
        self.inner.notifier.notify();
        Ok(stored)
    }

    pub fn update_message(&self, message: &ChatMessage) {
        lock(&self.inner.storage).update_message(message);
        self.inner.notifier.notify();
    }

    pub fn remove_messages_from_conversation(&self, conversation_id: &ConversationId) -> bool {
        let removed = lock(&self.inner.storage).remove_messages_from_conversation(conversation_id);
        self.inner.notifier.notify();
        removed
    }

    pub fn conversation_messages(&self, conversation_id: &ConversationId) -> Vec<MessageGroup> {
        lock(&self.inner.storage).conversation_messages(conversation_id).to_vec()
    }

    // ------------------------------------------------------------------
    // Input and typing
    // ------------------------------------------------------------------

    pub fn set_current_message(&self, text: &str) {
        lock(&self.inner.storage).set_current_message(text);
        self.inner.notifier.notify();
    }

    /// Stores `text` as the active conversation's draft.  Without an active
    /// conversation this does nothing.
    pub fn set_draft(&self, text: &str) {
        lock(&self.inner.storage).set_draft(text);
        self.inner.notifier.notify();
    }

    /// Emits a typing signal for the active conversation on behalf of the
    /// current user.  Without both of those the signal is dropped.
    pub fn send_typing(&self, params: SendTypingParams) {
        let SendTypingParams {
            content,
            is_typing,
            throttle,
        } = params;

        let target = {
            let guard = lock(&self.inner.storage);
            match (guard.active_conversation_id(), guard.current_user()) {
                (Some(conversation_id), Some(user)) => {
                    Some((conversation_id.clone(), user.id.clone()))
                }
                _ => None,
            }
        };

        let (conversation_id, user_id) = match target {
            Some(target) => target,
            None => {
                debug!("Typing signal dropped, no active conversation or current user");
                return;
            }
        };

        let service_params = SendTypingServiceParams {
            conversation_id,
            user_id,
            content,
            is_typing,
        };
        if throttle {
            self.inner.throttle.call(service_params);
        } else {
            self.inner.service.send_typing(service_params);
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Returns the storage to its pristine state, keeping the configured id
    /// generators and the message input.
    pub fn reset_state(&self) {
        lock(&self.inner.storage).reset_state();
        self.inner.notifier.notify();
    }
}

// ---------------------------------------------------------------------------
// Inbound event loop
// ---------------------------------------------------------------------------

async fn event_loop(
    mut events: broadcast::Receiver<ChatEvent>,
    storage: Arc<Mutex<ChatStorage>>,
    notifier: ChangeNotifier,
    debouncer: TypingDebouncer,
    debounce_typing: bool,
) {
    info!("Chat event loop started");

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Chat event stream lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event {
            ChatEvent::Message(event) => on_message(&storage, &notifier, event),
            ChatEvent::UserTyping(event) => {
                on_user_typing(&storage, &notifier, &debouncer, debounce_typing, event)
            }
            ChatEvent::UserPresenceChanged(event) => {
                let updated = lock(&storage).set_presence(&event.user_id, event.presence);
                if updated {
                    debug!(user = %event.user_id, "Presence updated");
                    notifier.notify();
                }
            }
            ChatEvent::ConnectionStateChanged(event) => {
                debug!(state = ?event.state, "Connection state changed");
            }
            ChatEvent::UserConnected(event) => {
                debug!(user = %event.user_id, "User connected");
            }
            ChatEvent::UserDisconnected(event) => {
                debug!(user = %event.user_id, "User disconnected");
            }
        }
    }

    info!("Chat event loop ended");
}

/// Applies an inbound message: store it, bump the unread counter when the
/// conversation is known and not active, and drop the sender's typing
/// indicator.
fn on_message(storage: &Arc<Mutex<ChatStorage>>, notifier: &ChangeNotifier, event: MessageEvent) {
    let MessageEvent {
        message,
        conversation_id,
    } = event;
    let sender_id = message.sender_id().clone();

    let stored = {
        let mut guard = lock(storage);
        let result = guard.add_message(message, &conversation_id, false);
        if result.is_ok() {
            let unread = guard.get_conversation(&conversation_id).map(|c| c.unread_counter);
            if let Some(unread) = unread {
                let is_active = guard.active_conversation_id() == Some(&conversation_id);
                if !is_active {
                    guard.set_unread(&conversation_id, unread + 1);
                }
            }
            guard.remove_typing_user(&conversation_id, &sender_id);
        }
        result
    };

    match stored {
        Ok(message) => {
            debug!(message = %message.id, conversation = %conversation_id, "Stored incoming message");
            notifier.notify();
        }
        Err(error) => warn!(%error, "Failed to store incoming message"),
    }
}

/// Applies an inbound typing signal.  Signals for unknown conversations are
/// dropped; known ones upsert the typing entry and arm the auto-clear timer.
fn on_user_typing(
    storage: &Arc<Mutex<ChatStorage>>,
    notifier: &ChangeNotifier,
    debouncer: &TypingDebouncer,
    debounce_typing: bool,
    event: UserTypingEvent,
) {
    let UserTypingEvent {
        conversation_id,
        user_id,
        content,
        is_typing,
    } = event;

    let added = lock(storage).add_typing_user(
        &conversation_id,
        TypingUser::new(user_id.clone(), &content, is_typing),
    );
    if !added {
        debug!(conversation = %conversation_id, "Typing signal for unknown conversation dropped");
        return;
    }

    if debounce_typing {
        debouncer.touch(conversation_id, user_id);
    }
    notifier.notify();
}
