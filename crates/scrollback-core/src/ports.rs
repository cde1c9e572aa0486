//! Interfaces the engine consumes but does not own.
//!
//! The host provides the message store, recipient metadata and viewport
//! geometry, and applies the render passes the engine emits.

use crate::model::{DisplayFlags, GroupId, Message, MessageId};
use crate::queue::TriggerQueue;
use crate::sticky::{HeaderRect, StickyHeaderUpdate};
use crate::view::RenderPass;
use std::ops::Range;
use std::sync::Arc;

/// Whether the store already holds the ends of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchStatus {
    pub found_oldest: bool,
    pub found_newest: bool,
}

impl FetchStatus {
    pub fn has_found_oldest(&self) -> bool {
        self.found_oldest
    }

    pub fn has_found_newest(&self) -> bool {
        self.found_newest
    }
}

/// Ordered message sequence owned by the host.
pub trait MessageStore {
    fn get(&self, id: MessageId) -> Option<Arc<Message>>;

    fn num_items(&self) -> usize;

    /// Messages at `range` in list order. Out-of-range parts are dropped.
    fn messages_in(&self, range: Range<usize>) -> Vec<Arc<Message>>;

    fn index_of(&self, id: MessageId) -> Option<usize>;

    fn fetch_status(&self) -> FetchStatus;

    fn all_messages(&self) -> Vec<Arc<Message>> {
        self.messages_in(0..self.num_items())
    }
}

pub const DEFAULT_CHANNEL_COLOR: &str = "#c2c2c2";

/// Channel and user metadata lookups. Treated as pure functions over state
/// the engine does not model.
pub trait RecipientDirectory {
    fn channel_name(&self, channel_id: u64) -> Option<String>;

    fn channel_color(&self, _channel_id: u64) -> Option<String> {
        None
    }

    fn is_subscribed(&self, _channel_id: u64) -> bool {
        true
    }

    fn user_full_name(&self, user_id: u64) -> Option<String>;

    fn is_sender_muted(&self, _user_id: u64) -> bool {
        false
    }

    fn topic_url(&self, _channel_id: u64, _topic: &str) -> Option<String> {
        None
    }

    fn same_recipient(&self, a: &Message, b: &Message) -> bool {
        a.recipient.same_as(&b.recipient)
    }

    fn same_sender(&self, a: &Message, b: &Message) -> bool {
        a.same_sender(b)
    }
}

/// Layout queries against the rendered list.
pub trait Viewport {
    /// Scroll position of the list container
    fn scroll_top(&self) -> f64;

    /// Top edge of the visible message area, below any persistent top bar
    fn visible_top(&self) -> f64;

    /// Materialized recipient headers. Callers must return them sorted top
    /// to bottom by screen position.
    fn headers(&self) -> Vec<HeaderRect>;

    /// Message row under the point at vertical position `y`, if any
    fn message_at(&self, y: f64) -> Option<MessageId>;

    /// First message row rendered after the given group's header
    fn first_row_after_header(&self, group: GroupId) -> Option<MessageId>;
}

/// Applies render passes to the actual UI.
///
/// The sink must not call back into the view while applying. Follow-up work
/// (a scroll event fired mid-render, say) goes into `queue` and runs after
/// the current pass.
pub trait RenderSink {
    fn apply(&mut self, pass: &RenderPass, queue: &TriggerQueue);

    fn update_sticky_header(&mut self, update: &StickyHeaderUpdate);
}

/// Receives display flag changes that the host wants to persist.
pub trait DisplayFlagsSink {
    fn persist(&mut self, id: MessageId, flags: DisplayFlags);
}

/// Write-back that drops every change.
#[derive(Debug, Default)]
pub struct DiscardFlags;

impl DisplayFlagsSink for DiscardFlags {
    fn persist(&mut self, _id: MessageId, _flags: DisplayFlags) {}
}
