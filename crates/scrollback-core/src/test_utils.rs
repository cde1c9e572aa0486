//! Test utilities for scrollback-core
//!
//! Fixed-data implementations of the host ports, shared by unit tests and
//! the integration tests under `tests/`.

use crate::model::{DisplayFlags, GroupId, Message, MessageId, Recipient};
use crate::ports::{DisplayFlagsSink, RecipientDirectory, RenderSink, Viewport};
use crate::queue::{Trigger, TriggerQueue};
use crate::sticky::{HeaderRect, StickyHeaderUpdate};
use crate::store::MemoryStore;
use crate::view::{Host, RenderPass};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub fn channel_message(id: u64, ts: i64, channel: u64, topic: &str, sender: u64) -> Arc<Message> {
    Arc::new(Message {
        id: MessageId::server(id),
        timestamp: ts,
        recipient: Recipient::channel(channel, topic),
        sender_id: sender,
        sender_full_name: format!("user{sender}"),
        historical: false,
        is_me_message: false,
        mentioned: false,
        mentioned_me_directly: false,
        edit_history: Vec::new(),
    })
}

pub fn direct_message(id: u64, ts: i64, users: &[u64], sender: u64) -> Arc<Message> {
    Arc::new(Message {
        recipient: Recipient::direct(users.iter().copied()),
        ..(*channel_message(id, ts, 0, "", sender)).clone()
    })
}

/// Directory backed by fixed maps.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    channels: HashMap<u64, (String, String)>,
    users: HashMap<u64, String>,
    muted: HashSet<u64>,
    unsubscribed: HashSet<u64>,
}

impl StaticDirectory {
    pub fn with_channel(mut self, id: u64, name: &str, color: &str) -> Self {
        self.channels
            .insert(id, (name.to_string(), color.to_string()));
        self
    }

    pub fn with_user(mut self, id: u64, name: &str) -> Self {
        self.users.insert(id, name.to_string());
        self
    }

    pub fn with_muted(mut self, user_id: u64) -> Self {
        self.muted.insert(user_id);
        self
    }

    pub fn with_unsubscribed(mut self, channel_id: u64) -> Self {
        self.unsubscribed.insert(channel_id);
        self
    }
}

impl RecipientDirectory for StaticDirectory {
    fn channel_name(&self, channel_id: u64) -> Option<String> {
        self.channels.get(&channel_id).map(|(name, _)| name.clone())
    }

    fn channel_color(&self, channel_id: u64) -> Option<String> {
        self.channels.get(&channel_id).map(|(_, color)| color.clone())
    }

    fn is_subscribed(&self, channel_id: u64) -> bool {
        !self.unsubscribed.contains(&channel_id)
    }

    fn user_full_name(&self, user_id: u64) -> Option<String> {
        self.users.get(&user_id).cloned()
    }

    fn is_sender_muted(&self, user_id: u64) -> bool {
        self.muted.contains(&user_id)
    }
}

/// Viewport with hand-placed headers and rows.
#[derive(Debug, Default, Clone)]
pub struct FakeViewport {
    pub scroll_top: f64,
    visible_top: f64,
    headers: Vec<HeaderRect>,
    rows: Vec<(MessageId, f64, f64)>,
    rows_after: HashMap<GroupId, MessageId>,
}

impl FakeViewport {
    pub fn new(visible_top: f64) -> Self {
        Self {
            visible_top,
            ..Default::default()
        }
    }

    pub fn with_headers(mut self, headers: Vec<HeaderRect>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_row(mut self, id: u64, top: f64, bottom: f64) -> Self {
        self.rows.push((MessageId::server(id), top, bottom));
        self
    }

    pub fn with_row_after(mut self, group: GroupId, id: u64) -> Self {
        self.rows_after.insert(group, MessageId::server(id));
        self
    }
}

impl Viewport for FakeViewport {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn visible_top(&self) -> f64 {
        self.visible_top
    }

    fn headers(&self) -> Vec<HeaderRect> {
        self.headers.clone()
    }

    fn message_at(&self, y: f64) -> Option<MessageId> {
        self.rows
            .iter()
            .find(|(_, top, bottom)| *top <= y && y < *bottom)
            .map(|(id, _, _)| *id)
    }

    fn first_row_after_header(&self, group: GroupId) -> Option<MessageId> {
        self.rows_after.get(&group).copied()
    }
}

/// Sink that records every pass. Triggers queued with `react_with` are
/// pushed into the view's queue from inside the next `apply`, the way a
/// scroll handler firing mid-render would.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub passes: Vec<RenderPass>,
    pub sticky_updates: Vec<StickyHeaderUpdate>,
    reactions: Vec<Trigger>,
}

impl RecordingSink {
    pub fn react_with(&mut self, trigger: Trigger) {
        self.reactions.push(trigger);
    }

    pub fn last_pass(&self) -> Option<&RenderPass> {
        self.passes.last()
    }
}

impl RenderSink for RecordingSink {
    fn apply(&mut self, pass: &RenderPass, queue: &TriggerQueue) {
        self.passes.push(pass.clone());
        for trigger in self.reactions.drain(..) {
            queue.push(trigger);
        }
    }

    fn update_sticky_header(&mut self, update: &StickyHeaderUpdate) {
        self.sticky_updates.push(update.clone());
    }
}

#[derive(Debug, Default)]
pub struct RecordingFlags {
    pub persisted: Vec<(MessageId, DisplayFlags)>,
}

impl DisplayFlagsSink for RecordingFlags {
    fn persist(&mut self, id: MessageId, flags: DisplayFlags) {
        self.persisted.push((id, flags));
    }
}

/// Owns one of each port so tests can borrow a `Host` per call.
#[derive(Debug, Default)]
pub struct HostFixture {
    pub store: MemoryStore,
    pub directory: StaticDirectory,
    pub viewport: FakeViewport,
    pub sink: RecordingSink,
}

impl HostFixture {
    pub fn new(messages: Vec<Arc<Message>>) -> Self {
        Self {
            store: MemoryStore::from_messages(messages),
            directory: StaticDirectory::default().with_channel(1, "general", "#76ce90"),
            ..Default::default()
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host {
            store: &self.store,
            directory: &self.directory,
            viewport: &self.viewport,
            sink: &mut self.sink,
        }
    }
}
