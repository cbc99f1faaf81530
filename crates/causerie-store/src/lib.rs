//! # causerie-store
//!
//! In-memory chat state engine: users, conversations with participants and
//! typing sets, messages grouped into consecutive same-sender runs, and the
//! cursors tying them together (current user, active conversation, message
//! input text).
//!
//! The crate exposes a single aggregate, [`ChatStorage`], mutated through
//! typed methods and read back wholesale as a [`ChatState`] snapshot.
//! Nothing here persists or talks to a network; transports and UI wiring
//! live in `causerie-client`.

pub mod conversations;
pub mod messages;
pub mod state;
pub mod storage;
pub mod users;

mod error;

pub use error::StoreError;
pub use state::ChatState;
pub use storage::{ChatStorage, GroupIdGenerator, MessageIdGenerator};
