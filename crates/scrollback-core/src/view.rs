//! The message list view.
//!
//! Owns the render window and the materialized groups, and turns host
//! triggers into render passes. Every pass runs grouping, then
//! reconciliation, then the window update, then the sink, then sticky
//! header resolution. Triggers raised while a pass runs are queued and
//! handled once it has finished.

use crate::config::EngineConfig;
use crate::dates::{Clock, SystemClock};
use crate::display::DisplayState;
use crate::error::{Error, Result};
use crate::grouping::GroupContext;
use crate::model::{GroupIdAllocator, Message, MessageGroup, MessageId};
use crate::planner::{self, RenderingPlan, Side};
use crate::ports::{DisplayFlagsSink, MessageStore, RecipientDirectory, RenderSink, Viewport};
use crate::queue::{Trigger, TriggerQueue};
use crate::sticky::{self, StickyHeaderUpdate};
use crate::window::RenderWindow;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// One unit of work for the render sink.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderPass {
    /// Drop everything rendered and show `groups` instead
    Replace {
        groups: Vec<MessageGroup>,
        /// Scroll position to restore once the new groups are laid out
        restore_scroll_top: Option<f64>,
    },
    /// Incremental change against what is already rendered
    Patch {
        plan: RenderingPlan,
        /// Live messages rather than fetched history
        messages_are_new: bool,
    },
}

/// Host ports borrowed for the duration of one call.
pub struct Host<'a> {
    pub store: &'a dyn MessageStore,
    pub directory: &'a dyn RecipientDirectory,
    pub viewport: &'a dyn Viewport,
    pub sink: &'a mut dyn RenderSink,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppendOutcome {
    /// Incremental plan for the messages that fit into the window
    pub plan: RenderingPlan,
    /// How many of the new messages were materialized
    pub rendered: usize,
    /// The selection ended up near a window edge and the window was rebuilt
    pub rerendered: bool,
}

/// Hints for the fetch layer. The view never fetches by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FetchSignals {
    pub older: bool,
    pub newer: bool,
}

/// Inputs to grouping that stay fixed between passes.
#[derive(Debug)]
struct Grouping {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    display: DisplayState,
    narrowed_channel: Option<u64>,
}

impl Grouping {
    fn ctx<'a>(&'a self, directory: &'a dyn RecipientDirectory) -> GroupContext<'a> {
        GroupContext {
            config: &self.config,
            directory,
            clock: self.clock.as_ref(),
            display: &self.display,
            narrowed_channel: self.narrowed_channel,
        }
    }
}

#[derive(Debug)]
pub struct MessageListView {
    grouping: Grouping,
    ids: GroupIdAllocator,
    window: RenderWindow,
    groups: Vec<MessageGroup>,
    /// Tracked by id so it survives prepends shifting indices
    selected: Option<MessageId>,
    queue: TriggerQueue,
}

impl MessageListView {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: RenderWindow::new(config.window_size, config.render_threshold),
            grouping: Grouping {
                config,
                clock,
                display: DisplayState::new(),
                narrowed_channel: None,
            },
            ids: GroupIdAllocator::new(),
            groups: Vec::new(),
            selected: None,
            queue: TriggerQueue::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.grouping.config
    }

    /// Restrict subscription markers to a single-channel view. Takes effect
    /// on the next pass.
    pub fn set_narrowed_channel(&mut self, channel: Option<u64>) {
        self.grouping.narrowed_channel = channel;
    }

    pub fn groups(&self) -> &[MessageGroup] {
        &self.groups
    }

    pub fn render_window(&self) -> &RenderWindow {
        &self.window
    }

    pub fn selected(&self) -> Option<MessageId> {
        self.selected
    }

    pub fn display(&self) -> &DisplayState {
        &self.grouping.display
    }

    /// For seeding persisted flags before the first render.
    pub fn display_mut(&mut self) -> &mut DisplayState {
        &mut self.grouping.display
    }

    /// Handle for sinks and host callbacks to defer work into.
    pub fn queue(&self) -> TriggerQueue {
        self.queue.clone()
    }

    fn selected_index(&self, store: &dyn MessageStore) -> Option<usize> {
        self.selected.and_then(|id| store.index_of(id))
    }

    fn select_index(&mut self, selected: usize, store: &dyn MessageStore) -> Option<usize> {
        let total = store.num_items();
        if total == 0 {
            self.selected = None;
            return None;
        }
        let idx = selected.min(total - 1);
        self.selected = store.messages_in(idx..idx + 1).first().map(|m| m.id);
        Some(idx)
    }

    /// Render the window around `selected` from scratch.
    pub fn render_initial(&mut self, selected: usize, host: &mut Host<'_>) {
        let total = host.store.num_items();
        let idx = self.select_index(selected, host.store).unwrap_or(0);
        self.window.update(idx, total, false);
        self.render_window_contents(host, None);
        self.drain(host);
    }

    /// Recenter on the current selection and render everything again.
    pub fn rerender(&mut self, host: &mut Host<'_>) {
        self.rerender_inner(host);
        self.drain(host);
    }

    fn rerender_inner(&mut self, host: &mut Host<'_>) {
        let total = host.store.num_items();
        let idx = self.selected_index(host.store).unwrap_or(0);
        self.window.update(idx, total, false);
        let scroll_top = host.viewport.scroll_top();
        self.render_window_contents(host, Some(scroll_top));
    }

    /// Rebuild the current window, asking the sink to keep the scroll
    /// position it had before.
    pub fn rerender_preserving_scrolltop(&mut self, host: &mut Host<'_>) {
        let scroll_top = host.viewport.scroll_top();
        self.render_window_contents(host, Some(scroll_top));
        self.drain(host);
    }

    fn render_window_contents(&mut self, host: &mut Host<'_>, restore_scroll_top: Option<f64>) {
        let messages = host.store.messages_in(self.window.range());
        let ctx = self.grouping.ctx(host.directory);
        self.groups = ctx.build_message_groups(&mut self.ids, &messages);
        debug!(
            target: "scrollback.view",
            "Rendering window {:?}: {} messages in {} groups",
            self.window.range(),
            messages.len(),
            self.groups.len()
        );

        let pass = RenderPass::Replace {
            groups: self.groups.clone(),
            restore_scroll_top,
        };
        host.sink.apply(&pass, &self.queue);
        self.update_sticky_header(host);
    }

    fn apply_patch(&mut self, plan: RenderingPlan, messages_are_new: bool, host: &mut Host<'_>) {
        let pass = RenderPass::Patch {
            plan,
            messages_are_new,
        };
        host.sink.apply(&pass, &self.queue);
        self.update_sticky_header(host);
    }

    /// Move the selection. Returns true when the window had to be rebuilt.
    pub fn select(&mut self, selected: usize, host: &mut Host<'_>) -> bool {
        let rerendered = self.select_inner(selected, host);
        self.drain(host);
        rerendered
    }

    fn select_inner(&mut self, selected: usize, host: &mut Host<'_>) -> bool {
        if self.select_index(selected, host.store).is_none() {
            return false;
        }
        self.maybe_rerender_inner(host)
    }

    /// Rebuild the window when the selection got within the threshold of
    /// an edge that is not also an edge of the whole list.
    pub fn maybe_rerender(&mut self, host: &mut Host<'_>) -> bool {
        let rerendered = self.maybe_rerender_inner(host);
        self.drain(host);
        rerendered
    }

    fn maybe_rerender_inner(&mut self, host: &mut Host<'_>) -> bool {
        let total = host.store.num_items();
        let Some(idx) = self.selected_index(host.store) else {
            return false;
        };
        if !self.window.needs_rerender(idx, total) || !self.window.update(idx, total, true) {
            return false;
        }
        debug!(
            target: "scrollback.view",
            "Selection {} drifted near a window edge, rerendering",
            idx
        );
        let scroll_top = host.viewport.scroll_top();
        self.render_window_contents(host, Some(scroll_top));
        true
    }

    fn merge(
        &mut self,
        messages: &[Arc<Message>],
        side: Side,
        directory: &dyn RecipientDirectory,
    ) -> Result<RenderingPlan> {
        let ctx = self.grouping.ctx(directory);
        let new_groups = ctx.build_message_groups(&mut self.ids, messages);
        planner::merge_message_groups(&ctx, &mut self.groups, new_groups, side)
    }

    /// `messages` were added at the end of the store, which must already
    /// hold them.
    pub fn append(
        &mut self,
        messages: &[Arc<Message>],
        messages_are_new: bool,
        host: &mut Host<'_>,
    ) -> Result<AppendOutcome> {
        let outcome = self.append_inner(messages, messages_are_new, host);
        self.drain(host);
        outcome
    }

    fn append_inner(
        &mut self,
        messages: &[Arc<Message>],
        messages_are_new: bool,
        host: &mut Host<'_>,
    ) -> Result<AppendOutcome> {
        let total_before = host.store.num_items().saturating_sub(messages.len());
        let saved = self.window;
        let fit = self.window.reserve_bottom(messages.len(), total_before);

        let mut outcome = AppendOutcome {
            rendered: fit,
            ..Default::default()
        };
        if fit > 0 {
            outcome.plan = match self.merge(&messages[..fit], Side::Bottom, host.directory) {
                Ok(plan) => plan,
                Err(e) => {
                    self.window = saved;
                    return Err(e);
                }
            };
            self.apply_patch(outcome.plan.clone(), messages_are_new, host);
        } else {
            trace!(
                target: "scrollback.view",
                "No room in render window for {} appended messages",
                messages.len()
            );
        }

        outcome.rerendered = self.maybe_rerender_inner(host);
        Ok(outcome)
    }

    /// `messages` were added at the start of the store, which must already
    /// hold them.
    pub fn prepend(
        &mut self,
        messages: &[Arc<Message>],
        host: &mut Host<'_>,
    ) -> Result<AppendOutcome> {
        let outcome = self.prepend_inner(messages, host);
        self.drain(host);
        outcome
    }

    fn prepend_inner(
        &mut self,
        messages: &[Arc<Message>],
        host: &mut Host<'_>,
    ) -> Result<AppendOutcome> {
        let saved = self.window;
        let fit = self.window.shift_for_prepend(messages.len());

        let mut outcome = AppendOutcome {
            rendered: fit,
            ..Default::default()
        };
        if fit > 0 {
            let visible = &messages[messages.len() - fit..];
            outcome.plan = match self.merge(visible, Side::Top, host.directory) {
                Ok(plan) => plan,
                Err(e) => {
                    self.window = saved;
                    return Err(e);
                }
            };
            self.apply_patch(outcome.plan.clone(), false, host);
        }

        outcome.rerendered = self.maybe_rerender_inner(host);
        Ok(outcome)
    }

    /// Recompute the containers of edited, hidden or revealed messages and
    /// rerender the groups that own them. Messages outside the window are
    /// ignored.
    pub fn rerender_messages(&mut self, ids: &[MessageId], host: &mut Host<'_>) -> Result<()> {
        let result = self.rerender_messages_inner(ids, host);
        self.drain(host);
        result
    }

    fn rerender_messages_inner(&mut self, ids: &[MessageId], host: &mut Host<'_>) -> Result<()> {
        let mut targets: Vec<usize> = ids
            .iter()
            .filter_map(|id| {
                let idx = self.groups.iter().position(|g| g.contains(*id));
                if idx.is_none() {
                    debug!(target: "scrollback.view", "Message {} is not rendered", id);
                }
                idx
            })
            .collect();
        targets.sort_unstable();
        targets.dedup();
        if targets.is_empty() {
            return Ok(());
        }

        let ctx = self.grouping.ctx(host.directory);
        let mut rebuilt = Vec::with_capacity(targets.len());
        let mut regrouped = false;
        for &idx in &targets {
            let group = &self.groups[idx];
            let mut messages = Vec::with_capacity(group.len());
            for id in group.message_ids() {
                let Some(msg) = host.store.get(id) else {
                    error!(
                        target: "scrollback.view",
                        "Message {} of group {} is missing from the store",
                        id,
                        group.id
                    );
                    return Err(Error::NotFound(format!("message {id} in {}", group.id)));
                };
                messages.push(msg);
            }

            let prev = idx
                .checked_sub(1)
                .and_then(|p| self.groups.get(p))
                .and_then(MessageGroup::last)
                .map(|c| Arc::clone(&c.msg));
            if let Some(group) = ctx.rebuild_group(group.id, &messages, prev.as_deref()) {
                rebuilt.push((idx, group));
            } else {
                regrouped = true;
                break;
            }
        }

        if regrouped {
            // An edit changed a recipient, so group boundaries moved.
            debug!(
                target: "scrollback.view",
                "Edited messages changed grouping, rerendering window"
            );
            let scroll_top = host.viewport.scroll_top();
            self.render_window_contents(host, Some(scroll_top));
            return Ok(());
        }

        let mut plan = RenderingPlan::default();
        for (idx, group) in rebuilt {
            self.groups[idx] = group.clone();
            plan.rerender_groups.push(group);
        }
        self.apply_patch(plan, false, host);
        Ok(())
    }

    pub fn set_collapsed(
        &mut self,
        id: MessageId,
        collapsed: bool,
        flags: &mut dyn DisplayFlagsSink,
        host: &mut Host<'_>,
    ) -> Result<bool> {
        if !self.grouping.display.set_collapsed(id, collapsed, flags) {
            return Ok(false);
        }
        self.rerender_messages(&[id], host).map(|()| true)
    }

    pub fn set_condensed(
        &mut self,
        id: MessageId,
        condensed: Option<bool>,
        flags: &mut dyn DisplayFlagsSink,
        host: &mut Host<'_>,
    ) -> Result<bool> {
        if !self.grouping.display.set_condensed(id, condensed, flags) {
            return Ok(false);
        }
        self.rerender_messages(&[id], host).map(|()| true)
    }

    /// Show one message from a muted sender.
    pub fn reveal_hidden_message(&mut self, id: MessageId, host: &mut Host<'_>) -> Result<bool> {
        if !self.grouping.display.reveal(id) {
            return Ok(false);
        }
        self.rerender_messages(&[id], host).map(|()| true)
    }

    pub fn update_sticky_header(&self, host: &mut Host<'_>) -> Option<StickyHeaderUpdate> {
        let update = sticky::resolve_sticky_header(
            host.viewport,
            host.store,
            self.grouping.config.zone,
            self.grouping.clock.as_ref(),
        )?;
        host.sink.update_sticky_header(&update);
        Some(update)
    }

    pub fn fetch_signals(&self, store: &dyn MessageStore) -> FetchSignals {
        let status = store.fetch_status();
        match self.selected_index(store) {
            Some(idx) => FetchSignals {
                older: self.window.should_fetch_older(idx, status),
                newer: self
                    .window
                    .should_fetch_newer(idx, store.num_items(), status),
            },
            None => FetchSignals {
                older: !status.has_found_oldest(),
                newer: !status.has_found_newest(),
            },
        }
    }

    /// Forget rendered state. Display flags are kept; they belong to the
    /// messages, not to this rendering.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.window.reset();
        self.selected = None;
        while self.queue.pop().is_some() {}
    }

    /// Handle `trigger` now, then anything it queued.
    pub fn dispatch(&mut self, trigger: Trigger, host: &mut Host<'_>) -> Result<()> {
        let result = self.run(trigger, host);
        self.drain(host);
        result
    }

    /// Run queued triggers in FIFO order until the queue is empty. Returns
    /// how many ran.
    pub fn drain(&mut self, host: &mut Host<'_>) -> usize {
        let mut ran = 0;
        while let Some(trigger) = self.queue.pop() {
            ran += 1;
            let name: &'static str = (&trigger).into();
            trace!(target: "scrollback.view", "Running deferred {}", name);
            if let Err(e) = self.run(trigger, host) {
                error!(target: "scrollback.view", "Deferred {} failed: {}", name, e);
            }
        }
        ran
    }

    fn run(&mut self, trigger: Trigger, host: &mut Host<'_>) -> Result<()> {
        match trigger {
            Trigger::Append {
                messages,
                messages_are_new,
            } => self
                .append_inner(&messages, messages_are_new, host)
                .map(|_| ()),
            Trigger::Prepend { messages } => self.prepend_inner(&messages, host).map(|_| ()),
            Trigger::SelectionChanged { selected } => {
                self.select_inner(selected, host);
                Ok(())
            }
            Trigger::MessagesChanged { ids } => self.rerender_messages_inner(&ids, host),
            Trigger::Scrolled => {
                self.update_sticky_header(host);
                Ok(())
            }
            Trigger::Rerender => {
                self.rerender_inner(host);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::FixedClock;
    use crate::test_utils::{HostFixture, RecordingFlags, channel_message};

    fn small_config() -> EngineConfig {
        EngineConfig {
            window_size: 10,
            render_threshold: 2,
            ..Default::default()
        }
    }

    fn view() -> MessageListView {
        MessageListView::with_clock(small_config(), Arc::new(FixedClock::at_timestamp(86_400)))
            .unwrap()
    }

    fn run_of(ids: std::ops::RangeInclusive<u64>, topic: &str, sender: u64) -> Vec<Arc<Message>> {
        ids.map(|id| channel_message(id, id as i64 * 100, 1, topic, sender))
            .collect()
    }

    fn rendered_ids(view: &MessageListView) -> Vec<u64> {
        view.groups()
            .iter()
            .flat_map(|g| g.message_ids().map(|id| id.base()))
            .collect()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            render_threshold: 10,
            window_size: 10,
            ..Default::default()
        };
        assert!(matches!(
            MessageListView::new(config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_render_initial_materializes_window() {
        let mut fx = HostFixture::new(run_of(1..=20, "a", 5));
        let mut view = view();

        view.render_initial(10, &mut fx.host());

        assert_eq!(view.render_window().range(), 5..15);
        assert_eq!(rendered_ids(&view), (6..=15).collect::<Vec<_>>());
        assert_eq!(view.selected(), Some(MessageId::server(11)));
        assert!(matches!(
            fx.sink.last_pass(),
            Some(RenderPass::Replace { groups, restore_scroll_top: None }) if groups.len() == 1
        ));
    }

    #[test]
    fn test_render_initial_on_empty_store() {
        let mut fx = HostFixture::new(Vec::new());
        let mut view = view();
        view.render_initial(0, &mut fx.host());

        assert!(view.groups().is_empty());
        assert_eq!(view.selected(), None);
        assert_eq!(
            view.fetch_signals(&fx.store),
            FetchSignals {
                older: true,
                newer: true
            }
        );
    }

    #[test]
    fn test_append_joins_last_group() {
        let mut fx = HostFixture::new(run_of(1..=6, "a", 5));
        let mut view = view();
        view.render_initial(5, &mut fx.host());
        let group_id = view.groups()[0].id;

        let incoming = run_of(7..=8, "a", 5);
        fx.store.push(incoming.clone());
        let outcome = view.append(&incoming, true, &mut fx.host()).unwrap();

        assert_eq!(outcome.rendered, 2);
        assert!(!outcome.rerendered);
        assert_eq!(outcome.plan.append_messages_to, Some(group_id));
        assert_eq!(outcome.plan.append_messages.len(), 2);
        assert_eq!(view.render_window().range(), 0..8);
        assert!(matches!(
            fx.sink.last_pass(),
            Some(RenderPass::Patch {
                messages_are_new: true,
                ..
            })
        ));
    }

    #[test]
    fn test_append_beyond_detached_window_renders_nothing() {
        let mut fx = HostFixture::new(run_of(1..=20, "a", 5));
        let mut view = view();
        view.render_initial(10, &mut fx.host());
        let passes = fx.sink.passes.len();

        let incoming = run_of(21..=21, "a", 5);
        fx.store.push(incoming.clone());
        let outcome = view.append(&incoming, true, &mut fx.host()).unwrap();

        assert_eq!(outcome.rendered, 0);
        assert!(outcome.plan.is_empty());
        assert_eq!(fx.sink.passes.len(), passes);
        assert_eq!(view.render_window().range(), 5..15);
    }

    #[test]
    fn test_prepend_at_top_grows_window_upwards() {
        let mut fx = HostFixture::new(run_of(10..=12, "a", 5));
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        let group_id = view.groups()[0].id;

        let older = run_of(7..=9, "a", 5);
        fx.store.prepend(older.clone());
        let outcome = view.prepend(&older, &mut fx.host()).unwrap();

        assert_eq!(outcome.rendered, 3);
        assert_eq!(view.render_window().range(), 0..6);
        assert_eq!(outcome.plan.rerender_groups.len(), 1);
        assert_eq!(outcome.plan.rerender_groups[0].id, group_id);
        assert_eq!(rendered_ids(&view), (7..=12).collect::<Vec<_>>());
        assert_eq!(view.selected(), Some(MessageId::server(10)));
    }

    #[test]
    fn test_selection_near_edge_rerenders_with_scroll_restore() {
        let mut fx = HostFixture::new(run_of(1..=20, "a", 5));
        fx.viewport.scroll_top = 420.0;
        let mut view = view();
        view.render_initial(10, &mut fx.host());

        assert!(!view.select(11, &mut fx.host()));
        assert!(view.select(13, &mut fx.host()));
        assert_eq!(view.render_window().range(), 8..18);
        assert!(matches!(
            fx.sink.last_pass(),
            Some(RenderPass::Replace {
                restore_scroll_top: Some(top),
                ..
            }) if (*top - 420.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_jump_above_window_recenters_without_threshold() {
        let mut fx = HostFixture::new(run_of(1..=100, "a", 5));
        let config = EngineConfig {
            window_size: 10,
            render_threshold: 0,
            ..Default::default()
        };
        let mut view =
            MessageListView::with_clock(config, Arc::new(FixedClock::at_timestamp(86_400)))
                .unwrap();
        view.render_initial(50, &mut fx.host());
        assert_eq!(view.render_window().range(), 45..55);

        assert!(view.select(5, &mut fx.host()));
        assert_eq!(view.render_window().range(), 0..10);
        assert!(view.render_window().range().contains(&5));
    }

    #[test]
    fn test_missing_message_aborts_rerender() {
        let messages = run_of(1..=3, "a", 5);
        let mut fx = HostFixture::new(messages.clone());
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        let passes = fx.sink.passes.len();

        fx.store = crate::store::MemoryStore::from_messages(vec![Arc::clone(&messages[0])]);
        let result = view.rerender_messages(&[MessageId::server(1)], &mut fx.host());

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(rendered_ids(&view), vec![1, 2, 3]);
        assert_eq!(fx.sink.passes.len(), passes);
    }

    #[test]
    fn test_topic_edit_regroups_window() {
        let mut fx = HostFixture::new(run_of(1..=3, "a", 5));
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        assert_eq!(view.groups().len(), 1);

        fx.store.replace(channel_message(2, 200, 1, "b", 5));
        view.rerender_messages(&[MessageId::server(2)], &mut fx.host())
            .unwrap();

        assert_eq!(view.groups().len(), 3);
        assert!(matches!(fx.sink.last_pass(), Some(RenderPass::Replace { .. })));
    }

    #[test]
    fn test_reveal_hidden_message_rerenders_its_group() {
        let mut fx = HostFixture::new(run_of(1..=2, "a", 6));
        fx.directory = fx.directory.clone().with_muted(6);
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        assert!(view.groups()[0].message_containers[0].is_hidden);

        assert!(view
            .reveal_hidden_message(MessageId::server(1), &mut fx.host())
            .unwrap());
        assert!(!view
            .reveal_hidden_message(MessageId::server(1), &mut fx.host())
            .unwrap());

        let containers = &view.groups()[0].message_containers;
        assert!(!containers[0].is_hidden);
        assert!(containers[1].is_hidden);
        assert!(matches!(
            fx.sink.last_pass(),
            Some(RenderPass::Patch { plan, .. }) if plan.rerender_groups.len() == 1
        ));
    }

    #[test]
    fn test_collapse_writes_back_once() {
        let mut fx = HostFixture::new(run_of(1..=2, "a", 5));
        let mut flags = RecordingFlags::default();
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        let id = MessageId::server(2);

        assert!(view.set_collapsed(id, true, &mut flags, &mut fx.host()).unwrap());
        assert!(!view.set_collapsed(id, true, &mut flags, &mut fx.host()).unwrap());

        assert_eq!(flags.persisted.len(), 1);
        assert!(view.groups()[0].message_containers[1].collapsed);
    }

    #[test]
    fn test_trigger_raised_during_apply_runs_afterwards() {
        let mut fx = HostFixture::new(run_of(1..=5, "a", 5));
        fx.sink.react_with(Trigger::Rerender);
        let mut view = view();

        view.render_initial(0, &mut fx.host());

        assert_eq!(fx.sink.passes.len(), 2);
        assert!(matches!(
            fx.sink.passes[1],
            RenderPass::Replace {
                restore_scroll_top: Some(_),
                ..
            }
        ));
        assert!(view.queue().is_empty());
    }

    #[test]
    fn test_clear_resets_rendering_state() {
        let mut fx = HostFixture::new(run_of(1..=5, "a", 5));
        let mut view = view();
        view.render_initial(0, &mut fx.host());
        view.queue().push(Trigger::Scrolled);

        view.clear();

        assert!(view.groups().is_empty());
        assert!(view.render_window().is_empty());
        assert!(view.queue().is_empty());
        assert_eq!(view.selected(), None);
    }
}
