use super::Command;
use crate::dump::MessageDump;
use crate::error::Error;
use crate::layout::TextLayout;
use chrono::{DateTime, Utc};
use eyre::Result;
use scrollback_core::config::ViewPreferences;
use scrollback_core::dates::{Clock, FixedClock, SystemClock};
use scrollback_core::model::MessageId;
use scrollback_core::ports::{DiscardFlags, MessageStore, RenderSink};
use scrollback_core::queue::TriggerQueue;
use scrollback_core::sticky::StickyHeaderUpdate;
use scrollback_core::store::MemoryStore;
use scrollback_core::view::{FetchSignals, Host, MessageListView, RenderPass};
use serde::Serialize;
use std::io::Write;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct RenderCommand {
    pub messages: PathBuf,
    pub selected: Option<MessageId>,
    pub index: Option<usize>,
    pub narrow: Option<u64>,
    pub time_zone: Option<String>,
    pub now: Option<DateTime<Utc>>,
    pub collapse: Vec<MessageId>,
    pub preferences: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub window: Range<usize>,
    pub total: usize,
    pub selected: Option<MessageId>,
    pub fetch: FetchSignals,
    pub passes: Vec<RenderPass>,
    pub sticky_header: Option<StickyHeaderUpdate>,
}

/// Keeps every pass for the report.
#[derive(Debug, Default)]
struct CollectingSink {
    passes: Vec<RenderPass>,
}

impl RenderSink for CollectingSink {
    fn apply(&mut self, pass: &RenderPass, _queue: &TriggerQueue) {
        self.passes.push(pass.clone());
    }

    fn update_sticky_header(&mut self, update: &StickyHeaderUpdate) {
        debug!(
            target: "scrollback.render",
            "Sticky header {} shows {}",
            update.group_id,
            update.date_label
        );
    }
}

impl Command for RenderCommand {
    fn execute(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.run(&mut stdout).map_err(Into::into)
    }
}

impl RenderCommand {
    pub fn run(&self, out: &mut impl Write) -> std::result::Result<(), Error> {
        let report = self.report()?;
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }

    pub fn report(&self) -> std::result::Result<RenderReport, Error> {
        let dump = MessageDump::load(&self.messages)?;

        let mut prefs = match &self.preferences {
            Some(path) => ViewPreferences::load_from(path)?,
            None => ViewPreferences::load()?,
        };
        if let Some(zone) = &self.time_zone {
            prefs.time_zone.clone_from(zone);
        }
        let config = prefs.engine_config()?;
        let clock: Arc<dyn Clock> = match self.now {
            Some(now) => Arc::new(FixedClock(now)),
            None => Arc::new(SystemClock),
        };

        let mut store = MemoryStore::from_messages(dump.sorted_messages());
        store.set_fetch_status(dump.fetch_status());
        let directory = dump.directory();
        let selected = self.selected_index(&store)?;

        let mut view = MessageListView::with_clock(config, clock)?;
        view.set_narrowed_channel(self.narrow);

        let mut sink = CollectingSink::default();
        let blank = TextLayout::default();
        view.render_initial(
            selected,
            &mut Host {
                store: &store,
                directory: &directory,
                viewport: &blank,
                sink: &mut sink,
            },
        );

        for &id in &self.collapse {
            view.set_collapsed(
                id,
                true,
                &mut DiscardFlags,
                &mut Host {
                    store: &store,
                    directory: &directory,
                    viewport: &blank,
                    sink: &mut sink,
                },
            )?;
        }

        // Lay out what was rendered, scroll to the selection, then resolve
        // the sticky header against that layout.
        let mut layout = TextLayout::measure(view.groups());
        if let Some(id) = view.selected() {
            layout = layout.scrolled_to(id);
        }
        let sticky_header = view.update_sticky_header(&mut Host {
            store: &store,
            directory: &directory,
            viewport: &layout,
            sink: &mut sink,
        });

        Ok(RenderReport {
            window: view.render_window().range(),
            total: store.num_items(),
            selected: view.selected(),
            fetch: view.fetch_signals(&store),
            passes: sink.passes,
            sticky_header,
        })
    }

    fn selected_index(&self, store: &MemoryStore) -> std::result::Result<usize, Error> {
        if let Some(id) = self.selected {
            return store
                .index_of(id)
                .ok_or_else(|| Error::UnknownMessage(id.to_string()));
        }
        Ok(self
            .index
            .unwrap_or_else(|| store.num_items().saturating_sub(1)))
    }
}
