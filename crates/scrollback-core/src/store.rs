//! In-memory message store for hosts that keep the whole list loaded.

use crate::model::{Message, MessageId};
use crate::ports::{FetchStatus, MessageStore};
use indexmap::IndexMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Ordered messages keyed by id. Callers keep the list sorted; the store
/// only preserves insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    messages: IndexMap<MessageId, Arc<Message>>,
    fetch_status: FetchStatus,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Arc<Message>>) -> Self {
        let mut store = Self::new();
        store.push(messages);
        store
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Add messages after the current end. Ids already present are skipped.
    /// Returns how many were added.
    pub fn push(&mut self, messages: Vec<Arc<Message>>) -> usize {
        let before = self.messages.len();
        for msg in messages {
            if self.messages.contains_key(&msg.id) {
                debug!(target: "scrollback.store", "Skipping duplicate message {}", msg.id);
                continue;
            }
            self.messages.insert(msg.id, msg);
        }
        self.messages.len() - before
    }

    /// Add messages before the current start, keeping their relative order.
    pub fn prepend(&mut self, messages: Vec<Arc<Message>>) -> usize {
        let mut merged = IndexMap::with_capacity(self.messages.len() + messages.len());
        for msg in messages {
            if self.messages.contains_key(&msg.id) || merged.contains_key(&msg.id) {
                debug!(target: "scrollback.store", "Skipping duplicate message {}", msg.id);
                continue;
            }
            merged.insert(msg.id, msg);
        }
        let added = merged.len();
        merged.extend(self.messages.drain(..));
        self.messages = merged;
        added
    }

    /// Swap in a new record for an existing message, keeping its position.
    pub fn replace(&mut self, message: Arc<Message>) -> bool {
        match self.messages.get_mut(&message.id) {
            Some(slot) => {
                *slot = message;
                true
            }
            None => false,
        }
    }

    pub fn set_fetch_status(&mut self, status: FetchStatus) {
        self.fetch_status = status;
    }
}

impl MessageStore for MemoryStore {
    fn get(&self, id: MessageId) -> Option<Arc<Message>> {
        self.messages.get(&id).cloned()
    }

    fn num_items(&self) -> usize {
        self.messages.len()
    }

    fn messages_in(&self, range: Range<usize>) -> Vec<Arc<Message>> {
        let end = range.end.min(self.messages.len());
        let start = range.start.min(end);
        self.messages
            .get_range(start..end)
            .map(|slice| slice.values().cloned().collect())
            .unwrap_or_default()
    }

    fn index_of(&self, id: MessageId) -> Option<usize> {
        self.messages.get_index_of(&id)
    }

    fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }
}
