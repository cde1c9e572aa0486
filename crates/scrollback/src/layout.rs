//! Fixed-height text layout of rendered groups, used as the viewport.
//!
//! Positions are document coordinates. Headers behave like sticky
//! elements: the header of the group under the scroll position is pinned
//! to the top edge until its group scrolls away.

use scrollback_core::model::{GroupId, MessageGroup, MessageId};
use scrollback_core::ports::Viewport;
use scrollback_core::sticky::HeaderRect;

pub const HEADER_HEIGHT: f64 = 32.0;
pub const ROW_HEIGHT: f64 = 44.0;
/// Continuation rows without a sender line
pub const COMPACT_ROW_HEIGHT: f64 = 24.0;
pub const DIVIDER_HEIGHT: f64 = 28.0;

#[derive(Debug, Clone, Copy)]
struct GroupBox {
    id: GroupId,
    top: f64,
    bottom: f64,
    first_row: Option<MessageId>,
}

#[derive(Debug, Clone, Copy)]
struct RowBox {
    id: MessageId,
    top: f64,
    bottom: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    groups: Vec<GroupBox>,
    rows: Vec<RowBox>,
    scroll_top: f64,
}

impl TextLayout {
    pub fn measure(groups: &[MessageGroup]) -> Self {
        let mut layout = Self::default();
        let mut y = 0.0;
        for group in groups {
            let top = y;
            y += HEADER_HEIGHT;
            for container in &group.message_containers {
                if container.want_date_divider {
                    y += DIVIDER_HEIGHT;
                }
                let height = if container.include_sender {
                    ROW_HEIGHT
                } else {
                    COMPACT_ROW_HEIGHT
                };
                layout.rows.push(RowBox {
                    id: container.id(),
                    top: y,
                    bottom: y + height,
                });
                y += height;
            }
            layout.groups.push(GroupBox {
                id: group.id,
                top,
                bottom: y,
                first_row: group.first().map(|c| c.id()),
            });
        }
        layout
    }

    /// Scroll so that `id`'s row starts at the top edge.
    pub fn scrolled_to(mut self, id: MessageId) -> Self {
        if let Some(row) = self.rows.iter().find(|r| r.id == id) {
            self.scroll_top = row.top;
        }
        self
    }

    pub fn height(&self) -> f64 {
        self.groups.last().map_or(0.0, |g| g.bottom)
    }
}

impl Viewport for TextLayout {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn visible_top(&self) -> f64 {
        self.scroll_top
    }

    fn headers(&self) -> Vec<HeaderRect> {
        self.groups
            .iter()
            .map(|g| {
                let pinned = self.scroll_top.min(g.bottom - HEADER_HEIGHT);
                let top = g.top.max(pinned);
                HeaderRect {
                    group_id: g.id,
                    top,
                    bottom: top + HEADER_HEIGHT,
                }
            })
            .collect()
    }

    fn message_at(&self, y: f64) -> Option<MessageId> {
        let idx = self.rows.partition_point(|r| r.bottom <= y);
        self.rows
            .get(idx)
            .filter(|r| r.top <= y)
            .map(|r| r.id)
    }

    fn first_row_after_header(&self, group: GroupId) -> Option<MessageId> {
        self.groups
            .iter()
            .find(|g| g.id == group)
            .and_then(|g| g.first_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollback_core::config::EngineConfig;
    use scrollback_core::dates::FixedClock;
    use scrollback_core::display::DisplayState;
    use scrollback_core::grouping::GroupContext;
    use scrollback_core::model::GroupIdAllocator;
    use scrollback_core::test_utils::{StaticDirectory, channel_message};

    fn groups() -> Vec<MessageGroup> {
        let config = EngineConfig::default();
        let directory = StaticDirectory::default();
        let clock = FixedClock::at_timestamp(0);
        let display = DisplayState::new();
        let ctx = GroupContext {
            config: &config,
            directory: &directory,
            clock: &clock,
            display: &display,
            narrowed_channel: None,
        };
        ctx.build_message_groups(
            &mut GroupIdAllocator::new(),
            &[
                channel_message(1, 100, 1, "a", 5),
                channel_message(2, 110, 1, "a", 5),
                channel_message(3, 120, 1, "b", 5),
            ],
        )
    }

    #[test]
    fn test_rows_stack_below_headers() {
        let layout = TextLayout::measure(&groups());
        assert_eq!(layout.message_at(HEADER_HEIGHT + 1.0), Some(MessageId::server(1)));
        assert_eq!(
            layout.message_at(HEADER_HEIGHT + ROW_HEIGHT + 1.0),
            Some(MessageId::server(2))
        );
        assert_eq!(layout.message_at(-5.0), None);
        let expected = 2.0 * HEADER_HEIGHT + 2.0 * ROW_HEIGHT + COMPACT_ROW_HEIGHT;
        assert!((layout.height() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_header_pins_to_scroll_position() {
        let layout = TextLayout::measure(&groups()).scrolled_to(MessageId::server(1));
        let headers = layout.headers();
        assert!((headers[0].top - layout.scroll_top()).abs() < f64::EPSILON);
        assert!(headers[1].top > headers[0].bottom);
    }
}
