//! Per-message display state owned by the view.

use crate::model::{DisplayFlags, MessageId};
use crate::ports::DisplayFlagsSink;
use std::collections::{HashMap, HashSet};

/// Side table of display flags keyed by message id.
///
/// Kept apart from the shared message records so the store and the view
/// never alias each other's state; the host learns about changes only
/// through the write-back sink.
#[derive(Debug, Default)]
pub struct DisplayState {
    flags: HashMap<MessageId, DisplayFlags>,
    revealed: HashSet<MessageId>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self, id: MessageId) -> DisplayFlags {
        self.flags.get(&id).copied().unwrap_or_default()
    }

    /// Seed flags from persisted state without writing them back.
    pub fn load(&mut self, id: MessageId, flags: DisplayFlags) {
        self.flags.insert(id, flags);
    }

    /// Returns false when nothing changed.
    pub fn set_collapsed(
        &mut self,
        id: MessageId,
        collapsed: bool,
        sink: &mut dyn DisplayFlagsSink,
    ) -> bool {
        let entry = self.flags.entry(id).or_default();
        if entry.collapsed == collapsed {
            return false;
        }
        entry.collapsed = collapsed;
        sink.persist(id, *entry);
        true
    }

    pub fn set_condensed(
        &mut self,
        id: MessageId,
        condensed: Option<bool>,
        sink: &mut dyn DisplayFlagsSink,
    ) -> bool {
        let entry = self.flags.entry(id).or_default();
        if entry.condensed == condensed {
            return false;
        }
        entry.condensed = condensed;
        sink.persist(id, *entry);
        true
    }

    pub fn reveal(&mut self, id: MessageId) -> bool {
        self.revealed.insert(id)
    }

    pub fn is_revealed(&self, id: MessageId) -> bool {
        self.revealed.contains(&id)
    }
}
