//! Message collection.
//!
//! Messages arrive in delivery order and are never removed during a
//! session. The only in-place mutation is the read flag, flipped by a
//! read receipt from the server.

use livesync_shared::Message;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Messages of one conversation, in collection order.
    pub fn in_conversation<'a>(
        &'a self,
        conversation_id: &'a str,
    ) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages
            .iter()
            .filter(move |m| m.conversation_id == conversation_id)
    }

    /// Append a live message.
    /// Returns false if a message with the same ID already exists (deduplication).
    pub fn append(&mut self, msg: Message) -> bool {
        if self.contains(&msg.id) {
            return false;
        }
        self.messages.push(msg);
        true
    }

    /// Flip the read flag. Returns true only if the flag changed.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(msg) if !msg.is_read => {
                msg.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Merge fetched history. Unknown ids are added, known ones are left
    /// alone so live state (read flags) wins; the result is kept in
    /// timestamp order. Returns the number of messages added.
    pub fn merge_history(&mut self, history: Vec<Message>) -> usize {
        let before = self.messages.len();
        for msg in history {
            if !self.contains(&msg.id) {
                self.messages.push(msg);
            }
        }

        let added = self.messages.len() - before;
        if added > 0 {
            self.messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }
        added
    }
}
