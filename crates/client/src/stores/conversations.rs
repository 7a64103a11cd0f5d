//! Conversation summaries, at most one per id.

use livesync_shared::Conversation;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
}

impl ConversationStore {
    pub fn all(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Replace in place if known, otherwise prepend.
    pub fn upsert(&mut self, conversation: Conversation) {
        match self.conversations.iter().position(|c| c.id == conversation.id) {
            Some(idx) => self.conversations[idx] = conversation,
            None => self.conversations.insert(0, conversation),
        }
    }

    /// Merge a fetched list: known ids are replaced in place, unknown ones
    /// are appended in the order given (they are older than anything pushed
    /// live). Returns true if anything changed.
    pub fn seed(&mut self, list: Vec<Conversation>) -> bool {
        let mut changed = false;
        for conversation in list {
            match self.conversations.iter().position(|c| c.id == conversation.id) {
                Some(idx) => {
                    if self.conversations[idx] != conversation {
                        self.conversations[idx] = conversation;
                        changed = true;
                    }
                }
                None => {
                    self.conversations.push(conversation);
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::test_support::conversation;

    fn ids(store: &ConversationStore) -> Vec<&str> {
        store.all().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn upsert_unknown_prepends() {
        let mut store = ConversationStore::default();
        store.upsert(conversation("c1", 0));
        store.upsert(conversation("c2", 0));
        assert_eq!(ids(&store), ["c2", "c1"]);
    }

    #[test]
    fn upsert_known_replaces_in_place() {
        let mut store = ConversationStore::default();
        store.upsert(conversation("c1", 0));
        store.upsert(conversation("c2", 0));
        store.upsert(conversation("c3", 0));

        store.upsert(conversation("c2", 4));
        assert_eq!(ids(&store), ["c3", "c2", "c1"]);
        assert_eq!(store.get("c2").unwrap().unread_count, 4);
    }

    #[test]
    fn seed_appends_and_replaces() {
        let mut store = ConversationStore::default();
        store.upsert(conversation("live", 1));

        assert!(store.seed(vec![conversation("a", 0), conversation("live", 2)]));
        assert_eq!(ids(&store), ["live", "a"]);
        assert_eq!(store.get("live").unwrap().unread_count, 2);

        assert!(!store.seed(vec![conversation("a", 0)]));
    }
}
