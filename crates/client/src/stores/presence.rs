//! Online-peer set.

use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresenceStore {
    online: HashSet<String>,
}

impl PresenceStore {
    pub fn online(&self) -> &HashSet<String> {
        &self.online
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    /// Replace the whole set with a server snapshot
    pub fn replace(&mut self, users: impl IntoIterator<Item = String>) {
        self.online = users.into_iter().collect();
    }

    /// Returns false if the user was already online.
    pub fn add(&mut self, user_id: String) -> bool {
        self.online.insert(user_id)
    }

    /// Returns false if the user wasn't online.
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.online.remove(user_id)
    }
}
