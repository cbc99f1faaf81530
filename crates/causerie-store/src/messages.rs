//! Message grouping operations on [`ChatStorage`].
//!
//! Messages are stored per conversation as ordered runs ([`MessageGroup`]):
//! a new message either extends the most recent run or opens a fresh one.

use causerie_model::{ChatMessage, ConversationId, MessageGroup};

use crate::error::Result;
use crate::storage::ChatStorage;

impl ChatStorage {
    /// Message groups of a conversation, oldest first.  Empty when the
    /// conversation has no messages (or does not exist).
    pub fn conversation_messages(&self, conversation_id: &ConversationId) -> &[MessageGroup] {
        self.messages
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Store a message in `conversation_id`'s group sequence and return the
    /// stored copy (with its final id).
    ///
    /// With `generate_id` set, the message receives a fresh id from the
    /// configured generator and any pre-assigned id is ignored; without a
    /// configured generator this fails with
    /// [`StoreError::IdGeneratorNotDefined`](crate::StoreError::IdGeneratorNotDefined).
    ///
    /// The message joins the conversation's most recent group when that
    /// group's sender id equals the message's sender id; otherwise a new
    /// group is opened with its id drawn from the group id generator.  The
    /// append check compares sender ids only, not directions.
    pub fn add_message(
        &mut self,
        message: ChatMessage,
        conversation_id: &ConversationId,
        generate_id: bool,
    ) -> Result<ChatMessage> {
        let mut message = message;
        if generate_id {
            message.id = self.generate_message_id(&message)?;
        }

        if let Some(groups) = self.messages.get_mut(conversation_id) {
            if let Some(last) = groups.last_mut() {
                if &last.sender_id == message.sender_id() {
                    last.add_message(message.clone());
                    return Ok(message);
                }
            }
        }

        let mut group = MessageGroup::new(
            self.next_group_id(),
            message.sender_id().clone(),
            message.direction,
        );
        group.add_message(message.clone());
        self.messages
            .entry(conversation_id.clone())
            .or_default()
            .push(group);

        Ok(message)
    }

    /// Replace every stored message whose id matches `message.id`, in every
    /// conversation and group.  Ids are expected to be globally unique, but
    /// the scan does not stop at the first match.  No-op when the id is
    /// found nowhere.
    pub fn update_message(&mut self, message: &ChatMessage) {
        for groups in self.messages.values_mut() {
            for group in groups.iter_mut() {
                group.replace_message(message);
            }
        }
    }

    /// Drop a conversation's entire group sequence.  Idempotent; returns
    /// `true` if anything was removed.
    pub fn remove_messages_from_conversation(&mut self, conversation_id: &ConversationId) -> bool {
        self.messages.remove(conversation_id).is_some()
    }
}
