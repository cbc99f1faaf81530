//! Client configuration.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Auto-draft policy
// ---------------------------------------------------------------------------

/// What happens to the shared message input when the active conversation
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDraft {
    /// Leave the input and all drafts untouched.
    Disabled,
    /// Save the input text into the conversation being left.
    Save,
    /// Move the entered conversation's stored draft into the input.
    Restore,
    /// Save on leave and restore on enter.
    SaveAndRestore,
}

impl AutoDraft {
    /// Returns `true` if the policy saves the input on leave.
    pub fn saves(&self) -> bool {
        matches!(self, Self::Save | Self::SaveAndRestore)
    }

    /// Returns `true` if the policy restores the stored draft on enter.
    pub fn restores(&self) -> bool {
        matches!(self, Self::Restore | Self::SaveAndRestore)
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for [`ChatClient`](crate::ChatClient).
///
/// The defaults are usable as-is; construct with `..Default::default()` to
/// override a single field.
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// Window applied to outbound typing signals.  At most one leading and
    /// one trailing signal are sent per window.
    ///
    /// Default: 250 ms.
    pub typing_throttle_time: Duration,

    /// Quiet period after which a remote user's typing indicator is cleared
    /// automatically.
    ///
    /// Default: 900 ms.
    pub typing_debounce_time: Duration,

    /// Whether inbound typing indicators are cleared automatically at all.
    ///
    /// Default: `true`.
    pub debounce_typing: bool,

    /// Draft handling applied by
    /// [`set_active_conversation`](crate::ChatClient::set_active_conversation).
    ///
    /// Default: [`AutoDraft::SaveAndRestore`].
    pub auto_draft: AutoDraft,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            typing_throttle_time: Duration::from_millis(250),
            typing_debounce_time: Duration::from_millis(900),
            debounce_typing: true,
            auto_draft: AutoDraft::SaveAndRestore,
        }
    }
}
