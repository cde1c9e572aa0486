//! Deferred triggers for work raised while a render pass is running.

use crate::model::{Message, MessageId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Discrete input to the view pipeline.
#[derive(Debug, Clone, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    /// New messages were added at the end of the list
    Append {
        messages: Vec<Arc<Message>>,
        messages_are_new: bool,
    },
    /// Older messages were added at the start of the list
    Prepend { messages: Vec<Arc<Message>> },
    SelectionChanged { selected: usize },
    /// Messages were edited, hidden or revealed
    MessagesChanged { ids: Vec<MessageId> },
    /// Layout moved; re-resolve the sticky header
    Scrolled,
    Rerender,
}

/// Cloneable FIFO handle. Sinks push into it while the view is busy; the
/// view drains it once the current pipeline run has finished.
#[derive(Debug, Clone, Default)]
pub struct TriggerQueue {
    inner: Arc<Mutex<VecDeque<Trigger>>>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, trigger: Trigger) {
        match self.inner.lock() {
            Ok(mut queue) => queue.push_back(trigger),
            Err(poisoned) => poisoned.into_inner().push_back(trigger),
        }
    }

    pub fn pop(&self) -> Option<Trigger> {
        match self.inner.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(queue) => queue.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_fifo() {
        let queue = TriggerQueue::new();
        let handle = queue.clone();
        handle.push(Trigger::Scrolled);
        handle.push(Trigger::SelectionChanged { selected: 3 });

        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(Trigger::Scrolled)));
        assert!(matches!(
            queue.pop(),
            Some(Trigger::SelectionChanged { selected: 3 })
        ));
        assert!(handle.is_empty());
    }
}
