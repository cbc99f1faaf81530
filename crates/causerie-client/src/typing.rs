//! Time-windowed typing coordination.
//!
//! Two independent mechanisms live here: [`TypingDebouncer`] clears remote
//! typing indicators after a quiet period, and [`TypingThrottle`] rate-limits
//! outbound typing signals to one leading and one trailing send per window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use causerie_model::{ConversationId, UserId};
use causerie_store::ChatStorage;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::lock;
use crate::notify::ChangeNotifier;
use crate::service::{ChatService, SendTypingServiceParams};

// ---------------------------------------------------------------------------
// Inbound debounce
// ---------------------------------------------------------------------------

/// Clears remote typing indicators after a quiet window.
///
/// Each (conversation, user) pair owns an independent timer.  A new signal
/// for a pair cancels and restarts its timer; expiry removes the pair's
/// typing entry from storage and announces the change.
#[derive(Clone)]
pub struct TypingDebouncer {
    window: Duration,
    storage: Arc<Mutex<ChatStorage>>,
    notifier: ChangeNotifier,
    state: Arc<Mutex<DebounceState>>,
}

#[derive(Default)]
struct DebounceState {
    next_generation: u64,
    timers: HashMap<(ConversationId, UserId), PendingClear>,
}

struct PendingClear {
    generation: u64,
    task: JoinHandle<()>,
}

impl TypingDebouncer {
    pub fn new(
        window: Duration,
        storage: Arc<Mutex<ChatStorage>>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            window,
            storage,
            notifier,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Starts the clear timer for a pair, replacing any timer already
    /// running for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn touch(&self, conversation_id: ConversationId, user_id: UserId) {
        let key = (conversation_id, user_id);

        let mut state = lock(&self.state);
        state.next_generation += 1;
        let generation = state.next_generation;

        if let Some(previous) = state.timers.remove(&key) {
            previous.task.abort();
        }

        let window = self.window;
        let storage = self.storage.clone();
        let notifier = self.notifier.clone();
        let shared = self.state.clone();
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;

            // A newer signal may have replaced this timer while it slept.
            {
                let mut state = lock(&shared);
                match state.timers.get(&task_key) {
                    Some(pending) if pending.generation == generation => {
                        state.timers.remove(&task_key);
                    }
                    _ => return,
                }
            }

            let (conversation_id, user_id) = task_key;
            let cleared = lock(&storage).remove_typing_user(&conversation_id, &user_id);
            if cleared {
                debug!(conversation = %conversation_id, user = %user_id, "Typing indicator expired");
                notifier.notify();
            }
        });

        state.timers.insert(key, PendingClear { generation, task });
    }

    /// Number of pairs with a clear still scheduled.
    pub(crate) fn pending(&self) -> usize {
        lock(&self.state).timers.len()
    }

    /// Aborts every scheduled clear.  Indicators already in storage stay put.
    pub(crate) fn cancel_pending(&self) {
        let mut state = lock(&self.state);
        for (_, pending) in state.timers.drain() {
            pending.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound throttle
// ---------------------------------------------------------------------------

/// Rate limiter for outbound typing signals.
///
/// The first call in a closed window is sent immediately and opens the
/// window.  Calls during an open window overwrite a single pending slot;
/// when the window elapses the latest pending signal is sent and the window
/// restarts.  A window that elapses with nothing pending closes.
pub struct TypingThrottle<S: ChatService> {
    window: Duration,
    service: Arc<S>,
    state: Arc<Mutex<ThrottleState>>,
}

#[derive(Default)]
struct ThrottleState {
    window_open: bool,
    pending: Option<SendTypingServiceParams>,
}

impl<S: ChatService> TypingThrottle<S> {
    pub fn new(window: Duration, service: Arc<S>) -> Self {
        Self {
            window,
            service,
            state: Arc::new(Mutex::new(ThrottleState::default())),
        }
    }

    /// Sends `params` now or queues it for the trailing flush.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self, params: SendTypingServiceParams) {
        {
            let mut state = lock(&self.state);
            if state.window_open {
                state.pending = Some(params);
                return;
            }
            state.window_open = true;
        }

        self.service.send_typing(params);
        self.spawn_flush();
    }

    fn spawn_flush(&self) {
        let window = self.window;
        let service = self.service.clone();
        let shared = self.state.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(window).await;

                let pending = {
                    let mut state = lock(&shared);
                    let taken = state.pending.take();
                    if taken.is_none() {
                        state.window_open = false;
                    }
                    taken
                };

                match pending {
                    Some(params) => service.send_typing(params),
                    None => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use causerie_model::{ChatEvent, Conversation, TypingUser};
    use tokio::sync::broadcast;
    use tokio::task::yield_now;
    use tokio::time::advance;

    use crate::service::SendMessageServiceParams;

    struct RecordingService {
        typing: Mutex<Vec<SendTypingServiceParams>>,
        events: broadcast::Sender<ChatEvent>,
    }

    impl RecordingService {
        fn new() -> Self {
            Self {
                typing: Mutex::new(Vec::new()),
                events: broadcast::channel(16).0,
            }
        }

        fn sent_contents(&self) -> Vec<String> {
            lock(&self.typing).iter().map(|p| p.content.clone()).collect()
        }
    }

    impl ChatService for RecordingService {
        fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
            self.events.subscribe()
        }

        fn send_message(&self, _params: SendMessageServiceParams) {}

        fn send_typing(&self, params: SendTypingServiceParams) {
            lock(&self.typing).push(params);
        }
    }

    fn typing_params(content: &str) -> SendTypingServiceParams {
        SendTypingServiceParams {
            conversation_id: "c1".into(),
            user_id: "u1".into(),
            content: content.to_string(),
            is_typing: true,
        }
    }

    fn storage_with_typing_user(
        conversation_id: &str,
        user_id: &str,
    ) -> Arc<Mutex<ChatStorage>> {
        let mut storage = ChatStorage::new(Box::new(|| "g1".into()));
        storage.add_conversation(Conversation::new(conversation_id.into()));
        storage.add_typing_user(
            &conversation_id.into(),
            TypingUser::new(user_id.into(), "hi", true),
        );
        Arc::new(Mutex::new(storage))
    }

    fn typing_count(storage: &Arc<Mutex<ChatStorage>>, conversation_id: &str) -> usize {
        lock(storage)
            .get_conversation(&conversation_id.into())
            .map(|c| c.typing_users.len())
            .unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_clears_after_quiet_window() {
        let storage = storage_with_typing_user("c1", "u1");
        let notifier = ChangeNotifier::new();
        let debouncer =
            TypingDebouncer::new(Duration::from_millis(900), storage.clone(), notifier.clone());

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;
        assert_eq!(debouncer.pending(), 1);

        advance(Duration::from_millis(899)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 1);

        advance(Duration::from_millis(1)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 0);
        assert_eq!(debouncer.pending(), 0);
        assert_eq!(notifier.version(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_restart_defers_clear() {
        let storage = storage_with_typing_user("c1", "u1");
        let notifier = ChangeNotifier::new();
        let debouncer =
            TypingDebouncer::new(Duration::from_millis(900), storage.clone(), notifier.clone());

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;
        advance(Duration::from_millis(500)).await;
        yield_now().await;

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;

        // 1000 ms after the first signal, but only 500 ms after the second.
        advance(Duration::from_millis(500)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 1);

        advance(Duration::from_millis(400)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_pairs_run_independently() {
        let storage = storage_with_typing_user("c1", "u1");
        lock(&storage).add_typing_user(&"c1".into(), TypingUser::new("u2".into(), "yo", true));
        let notifier = ChangeNotifier::new();
        let debouncer =
            TypingDebouncer::new(Duration::from_millis(900), storage.clone(), notifier.clone());

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;
        advance(Duration::from_millis(400)).await;
        yield_now().await;
        debouncer.touch("c1".into(), "u2".into());
        yield_now().await;

        advance(Duration::from_millis(500)).await;
        yield_now().await;
        let remaining: Vec<_> = lock(&storage)
            .get_conversation(&"c1".into())
            .unwrap()
            .typing_users
            .iter()
            .map(|t| t.user_id.clone())
            .collect();
        assert_eq!(remaining, vec!["u2".into()]);

        advance(Duration::from_millis(400)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_expiry_on_missing_entry_stays_silent() {
        let storage = storage_with_typing_user("c1", "u1");
        let notifier = ChangeNotifier::new();
        let debouncer =
            TypingDebouncer::new(Duration::from_millis(900), storage.clone(), notifier.clone());

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;
        lock(&storage).remove_conversation(&"c1".into(), true);

        advance(Duration::from_millis(900)).await;
        yield_now().await;
        assert_eq!(debouncer.pending(), 0);
        assert_eq!(notifier.version(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel_pending_keeps_indicator() {
        let storage = storage_with_typing_user("c1", "u1");
        let notifier = ChangeNotifier::new();
        let debouncer =
            TypingDebouncer::new(Duration::from_millis(900), storage.clone(), notifier.clone());

        debouncer.touch("c1".into(), "u1".into());
        yield_now().await;
        debouncer.cancel_pending();

        advance(Duration::from_millis(2000)).await;
        yield_now().await;
        assert_eq!(typing_count(&storage, "c1"), 1);
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_sends_leading_immediately() {
        let service = Arc::new(RecordingService::new());
        let throttle = TypingThrottle::new(Duration::from_millis(100), service.clone());

        throttle.call(typing_params("a"));
        assert_eq!(service.sent_contents(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_burst_sends_leading_and_latest_trailing() {
        let service = Arc::new(RecordingService::new());
        let throttle = TypingThrottle::new(Duration::from_millis(100), service.clone());

        throttle.call(typing_params("a"));
        yield_now().await;
        advance(Duration::from_millis(5)).await;
        throttle.call(typing_params("b"));
        advance(Duration::from_millis(45)).await;
        throttle.call(typing_params("c"));

        // Still inside the window: only the leading send went out.
        assert_eq!(service.sent_contents(), vec!["a"]);

        advance(Duration::from_millis(50)).await;
        yield_now().await;
        assert_eq!(service.sent_contents(), vec!["a", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_trailing_send_restarts_window() {
        let service = Arc::new(RecordingService::new());
        let throttle = TypingThrottle::new(Duration::from_millis(100), service.clone());

        throttle.call(typing_params("a"));
        yield_now().await;
        throttle.call(typing_params("b"));
        advance(Duration::from_millis(100)).await;
        yield_now().await;
        assert_eq!(service.sent_contents(), vec!["a", "b"]);

        // The trailing send reopened the window, so this call queues.
        throttle.call(typing_params("c"));
        assert_eq!(service.sent_contents(), vec!["a", "b"]);

        advance(Duration::from_millis(100)).await;
        yield_now().await;
        assert_eq!(service.sent_contents(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_quiet_window_closes() {
        let service = Arc::new(RecordingService::new());
        let throttle = TypingThrottle::new(Duration::from_millis(100), service.clone());

        throttle.call(typing_params("a"));
        yield_now().await;
        advance(Duration::from_millis(100)).await;
        yield_now().await;

        // Window elapsed with nothing pending, so the next call leads again.
        throttle.call(typing_params("b"));
        assert_eq!(service.sent_contents(), vec!["a", "b"]);
    }
}
