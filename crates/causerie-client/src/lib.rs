//! # causerie-client
//!
//! Consumer-facing orchestration for the causerie chat engine.  A
//! [`ChatClient`] wires a [`causerie_store::ChatStorage`] to a transport
//! behind the [`ChatService`] trait, applies inbound events from a
//! background loop, coordinates typing debounce and throttle windows, and
//! publishes a change counter that tells consumers when to re-read state.
//!
//! [`LocalChatService`] is a loopback transport for demos and tests; real
//! deployments implement [`ChatService`] over their own wire.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod client;
pub mod config;
pub mod local;
pub mod notify;
pub mod service;
pub mod typing;

pub use client::{ChatClient, SendMessageParams, SendTypingParams};
pub use config::{AutoDraft, ChatClientConfig};
pub use local::{LocalBus, LocalChatService};
pub use notify::ChangeNotifier;
pub use service::{ChatService, SendMessageServiceParams, SendTypingServiceParams};
pub use typing::{TypingDebouncer, TypingThrottle};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
