//! Conversation, participant, and typing registry operations on
//! [`ChatStorage`].

use causerie_model::{Conversation, ConversationId, Participant, TypingUser, UserId};
use tracing::debug;

use crate::storage::ChatStorage;

impl ChatStorage {
    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    pub fn conversation_exists(&self, conversation_id: &ConversationId) -> bool {
        self.conversations.iter().any(|c| &c.id == conversation_id)
    }

    pub fn get_conversation(&self, conversation_id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == conversation_id)
    }

    pub fn get_conversation_mut(&mut self, conversation_id: &ConversationId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| &c.id == conversation_id)
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Add a conversation unless one with the same id exists.  Returns
    /// `true` if the conversation was added.
    pub fn add_conversation(&mut self, conversation: Conversation) -> bool {
        if self.conversation_exists(&conversation.id) {
            return false;
        }
        self.conversations.push(conversation);
        true
    }

    /// Replace the stored conversation with the same id wholesale:
    /// participants, typing users, unread counter, draft, description,
    /// readonly flag and attached data all come from `conversation`.
    /// Returns `true` if a conversation was replaced.
    pub fn update_conversation(&mut self, conversation: Conversation) -> bool {
        match self.conversations.iter().position(|c| c.id == conversation.id) {
            Some(idx) => {
                self.conversations[idx] = conversation;
                true
            }
            None => false,
        }
    }

    /// Remove the conversation with `conversation_id`; with `remove_messages`
    /// its message groups go too.  Returns `true` if a conversation was
    /// removed; an absent id mutates nothing, message groups included.
    /// Clearing the active-conversation cursor is the caller's concern.
    pub fn remove_conversation(&mut self, conversation_id: &ConversationId, remove_messages: bool) -> bool {
        match self.conversations.iter().position(|c| &c.id == conversation_id) {
            Some(idx) => {
                self.conversations.remove(idx);
                if remove_messages {
                    self.remove_messages_from_conversation(conversation_id);
                }
                debug!(conversation = %conversation_id, remove_messages, "Conversation removed");
                true
            }
            None => false,
        }
    }

    /// Set a conversation's unread counter.  No-op when the conversation is
    /// absent.
    pub fn set_unread(&mut self, conversation_id: &ConversationId, count: u32) {
        if let Some(conversation) = self.get_conversation_mut(conversation_id) {
            conversation.unread_counter = count;
        }
    }

    // ------------------------------------------------------------------
    // Participants
    // ------------------------------------------------------------------

    /// Add a participant to a conversation.  Returns `true` if the
    /// participant was added; `false` when the conversation is absent or
    /// the user is already a participant.
    pub fn add_participant(&mut self, conversation_id: &ConversationId, participant: Participant) -> bool {
        match self.get_conversation_mut(conversation_id) {
            Some(conversation) => conversation.add_participant(participant),
            None => false,
        }
    }

    /// Remove a participant from a conversation.  Returns `true` if one was
    /// removed.
    pub fn remove_participant(&mut self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        match self.get_conversation_mut(conversation_id) {
            Some(conversation) => conversation.remove_participant(user_id),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Typing users
    // ------------------------------------------------------------------

    /// Upsert a typing entry on a conversation (last write wins per user).
    /// Returns `false` when the conversation is absent.
    pub fn add_typing_user(&mut self, conversation_id: &ConversationId, typing_user: TypingUser) -> bool {
        match self.get_conversation_mut(conversation_id) {
            Some(conversation) => {
                conversation.add_typing_user(typing_user);
                true
            }
            None => false,
        }
    }

    /// Drop a user's typing entry from a conversation.  Returns `true` if
    /// an entry was removed.
    pub fn remove_typing_user(&mut self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        match self.get_conversation_mut(conversation_id) {
            Some(conversation) => conversation.remove_typing_user(user_id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causerie_model::{
        ChatMessage, ConversationRole, GroupId, MessageContent, MessageDirection, Sender,
    };
    use serde_json::json;

    fn storage() -> ChatStorage {
        ChatStorage::new(Box::new(|| GroupId::from("g")))
    }

    fn outgoing(sender: &str) -> ChatMessage {
        ChatMessage::new(
            Sender::user(UserId::from(sender)),
            MessageDirection::Outgoing,
            MessageContent::text("hi"),
        )
    }

    #[test]
    fn test_add_conversation_rejects_duplicate_id() {
        let mut storage = storage();
        assert!(storage.add_conversation(Conversation::new(ConversationId::from("c1"))));
        assert!(!storage.add_conversation(Conversation::new(ConversationId::from("c1"))));
        assert_eq!(storage.conversations().len(), 1);
    }

    #[test]
    fn test_remove_conversation_reports_absence() {
        let mut storage = storage();
        assert!(!storage.remove_conversation(&ConversationId::from("c1"), false));

        // Groups can exist for an id with no conversation record; an absent
        // id leaves them alone even when message removal is requested.
        storage
            .add_message(outgoing("u1"), &ConversationId::from("ghost"), false)
            .unwrap();
        assert!(!storage.remove_conversation(&ConversationId::from("ghost"), true));
        assert_eq!(storage.conversation_messages(&ConversationId::from("ghost")).len(), 1);

        storage.add_conversation(Conversation::new(ConversationId::from("c1")));
        assert!(storage.remove_conversation(&ConversationId::from("c1"), false));
        assert!(storage.conversations().is_empty());
    }

    #[test]
    fn test_remove_conversation_can_take_its_messages() {
        let mut storage = storage();
        storage.add_conversation(Conversation::new(ConversationId::from("c1")));
        storage
            .add_message(outgoing("u1"), &ConversationId::from("c1"), false)
            .unwrap();

        assert!(storage.remove_conversation(&ConversationId::from("c1"), true));
        assert!(storage.conversation_messages(&ConversationId::from("c1")).is_empty());
        assert!(storage.conversations().is_empty());
    }

    #[test]
    fn test_update_conversation_round_trips_fields() {
        let mut storage = storage();
        storage.add_conversation(Conversation::new(ConversationId::from("c1")));

        let mut replacement = Conversation::new(ConversationId::from("c1"))
            .with_description("support thread")
            .with_data(json!({"topic": "billing"}));
        replacement.draft = "half-written".to_string();
        replacement.unread_counter = 7;
        replacement.readonly = true;
        replacement.add_participant(
            Participant::new(UserId::from("u1")).with_role(ConversationRole(vec!["moderator".to_string()])),
        );

        assert!(storage.update_conversation(replacement.clone()));
        let stored = storage.get_conversation(&ConversationId::from("c1")).unwrap();
        assert_eq!(stored, &replacement);

        let stray = Conversation::new(ConversationId::from("c2"));
        assert!(!storage.update_conversation(stray));
        assert_eq!(storage.conversations().len(), 1);
    }

    #[test]
    fn test_set_unread_ignores_unknown_conversation() {
        let mut storage = storage();
        storage.set_unread(&ConversationId::from("c1"), 3);
        assert!(storage.conversations().is_empty());

        storage.add_conversation(Conversation::new(ConversationId::from("c1")));
        storage.set_unread(&ConversationId::from("c1"), 3);
        assert_eq!(
            storage.get_conversation(&ConversationId::from("c1")).unwrap().unread_counter,
            3
        );
    }

    #[test]
    fn test_participant_ops_require_conversation() {
        let mut storage = storage();
        assert!(!storage.add_participant(&ConversationId::from("c1"), Participant::new(UserId::from("u1"))));
        assert!(!storage.remove_participant(&ConversationId::from("c1"), &UserId::from("u1")));

        storage.add_conversation(Conversation::new(ConversationId::from("c1")));
        assert!(storage.add_participant(&ConversationId::from("c1"), Participant::new(UserId::from("u1"))));
        assert!(!storage.add_participant(&ConversationId::from("c1"), Participant::new(UserId::from("u1"))));
        assert!(storage.remove_participant(&ConversationId::from("c1"), &UserId::from("u1")));
        assert!(!storage.remove_participant(&ConversationId::from("c1"), &UserId::from("u1")));
    }

    #[test]
    fn test_typing_ops_target_one_conversation() {
        let mut storage = storage();
        storage.add_conversation(Conversation::new(ConversationId::from("c1")));
        storage.add_conversation(Conversation::new(ConversationId::from("c2")));

        assert!(storage.add_typing_user(
            &ConversationId::from("c1"),
            TypingUser::new(UserId::from("u1"), "hi", true),
        ));
        assert!(!storage.add_typing_user(
            &ConversationId::from("c9"),
            TypingUser::new(UserId::from("u1"), "", true),
        ));

        let c1 = storage.get_conversation(&ConversationId::from("c1")).unwrap();
        let c2 = storage.get_conversation(&ConversationId::from("c2")).unwrap();
        assert_eq!(c1.typing_users.len(), 1);
        assert!(c2.typing_users.is_empty());

        assert!(storage.remove_typing_user(&ConversationId::from("c1"), &UserId::from("u1")));
        assert!(!storage.remove_typing_user(&ConversationId::from("c1"), &UserId::from("u1")));
    }
}
