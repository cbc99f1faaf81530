//! Change notification for state consumers.

use std::sync::Arc;

use tokio::sync::watch;

/// Monotonic change counter published over a watch channel.
///
/// The counter carries no payload; a movement means "re-read the state".
/// Consumers hold the [`watch::Receiver`] from [`subscribe`](Self::subscribe)
/// and await [`changed`](watch::Receiver::changed).
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Bumps the counter, waking every subscriber.
    pub fn notify(&self) {
        self.tx.send_modify(|version| *version += 1);
    }

    /// Opens a subscription positioned at the current counter value.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// The current counter value.
    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_bumps_version_and_wakes_subscriber() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();
        assert_eq!(*rx.borrow(), 0);

        notifier.notify();
        notifier.notify();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
        assert_eq!(notifier.version(), 2);
    }
}
