//! Classify a message's edit history into the indicator shown next to it.

use crate::model::{EditHistoryEntry, EditStatus};

pub const RESOLVED_TOPIC_PREFIX: &str = "✔ ";

pub fn is_topic_resolved(topic: &str) -> bool {
    topic.starts_with(RESOLVED_TOPIC_PREFIX)
}

/// True when going from `prev` to `next` only added or removed the resolved
/// marker. A rename to some other text that happens to start with the marker
/// is still a rename.
pub fn is_resolve_toggle(prev: &str, next: &str) -> bool {
    match (
        prev.strip_prefix(RESOLVED_TOPIC_PREFIX),
        next.strip_prefix(RESOLVED_TOPIC_PREFIX),
    ) {
        (None, Some(rest)) => rest == prev,
        (Some(rest), None) => rest == next,
        _ => false,
    }
}

fn is_move(entry: &EditHistoryEntry) -> bool {
    if entry.prev_channel_id.is_some() {
        return true;
    }
    match (&entry.prev_topic, &entry.topic) {
        (Some(prev), Some(next)) => !is_resolve_toggle(prev, next),
        (Some(_), None) => true,
        _ => false,
    }
}

/// A content edit wins over a move; within each kind the newest entry's
/// timestamp is reported.
pub fn edit_status(history: &[EditHistoryEntry]) -> EditStatus {
    let last_edit = history
        .iter()
        .filter(|e| e.prev_content.is_some())
        .map(|e| e.timestamp)
        .max();
    if let Some(timestamp) = last_edit {
        return EditStatus::Edited { timestamp };
    }

    history
        .iter()
        .filter(|e| is_move(e))
        .map(|e| e.timestamp)
        .max()
        .map_or(EditStatus::None, |timestamp| EditStatus::Moved { timestamp })
}
