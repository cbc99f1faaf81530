//! User registry operations on [`ChatStorage`].

use causerie_model::{Presence, User, UserId};

use crate::storage::ChatStorage;

impl ChatStorage {
    pub fn user_exists(&self, user_id: &UserId) -> bool {
        self.users.iter().any(|u| &u.id == user_id)
    }

    pub fn get_user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Add a user unless one with the same id exists.  Returns `true` if
    /// the user was added.
    pub fn add_user(&mut self, user: User) -> bool {
        if self.user_exists(&user.id) {
            return false;
        }
        self.users.push(user);
        true
    }

    /// Remove the user with `user_id`.  Returns `true` if a user was
    /// removed.
    pub fn remove_user(&mut self, user_id: &UserId) -> bool {
        match self.users.iter().position(|u| &u.id == user_id) {
            Some(idx) => {
                self.users.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replace a user's presence wholesale.  Returns `true` if a user was
    /// updated.
    pub fn set_presence(&mut self, user_id: &UserId, presence: Presence) -> bool {
        match self.users.iter_mut().find(|u| &u.id == user_id) {
            Some(user) => {
                user.presence = presence;
                true
            }
            None => false,
        }
    }
}
