//! Find the recipient header pinned at the top of the viewport and the
//! date it should display.

use crate::dates::{self, Clock, DateLabel, DisplayZone};
use crate::model::{GroupId, MessageId};
use crate::ports::{MessageStore, Viewport};
use serde::Serialize;
use tracing::{debug, error};

/// Slack below a header's height within which it still counts as sticky.
pub const STICKY_MARGIN: f64 = 10.0;
/// Hit-test offset above a header's bottom edge when probing for the row
/// underneath it.
pub const ROW_PROBE_PADDING: f64 = 2.0;

/// Screen position of one rendered recipient header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeaderRect {
    pub group_id: GroupId,
    pub top: f64,
    pub bottom: f64,
}

impl HeaderRect {
    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyClass {
    /// Scrolled above the boundary; the sticky header comes later
    Above,
    Sticky,
    /// Still below the band; the sticky header comes earlier
    Below,
}

pub fn classify(header: &HeaderRect, boundary: f64, margin: f64) -> StickyClass {
    if header.top < boundary - 1.0 {
        StickyClass::Above
    } else if header.top > boundary + header.height() + margin {
        StickyClass::Below
    } else {
        StickyClass::Sticky
    }
}

/// Binary search for the sticky header. `headers` must be sorted top to
/// bottom.
pub fn find_sticky_header(headers: &[HeaderRect], boundary: f64, margin: f64) -> Option<usize> {
    let (mut lo, mut hi) = (0, headers.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match classify(&headers[mid], boundary, margin) {
            StickyClass::Sticky => return Some(mid),
            StickyClass::Above => lo = mid + 1,
            StickyClass::Below => hi = mid,
        }
    }
    None
}

/// Reference scan with the same classification.
pub fn linear_find_sticky_header(
    headers: &[HeaderRect],
    boundary: f64,
    margin: f64,
) -> Option<usize> {
    headers
        .iter()
        .position(|h| classify(h, boundary, margin) == StickyClass::Sticky)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StickyHeaderUpdate {
    pub group_id: GroupId,
    /// Message whose date the header shows
    pub message_id: MessageId,
    pub date_label: DateLabel,
    /// Recipient row whose date label now duplicates the sticky one
    pub hide_date_on_group: Option<GroupId>,
}

pub fn resolve_sticky_header(
    viewport: &dyn Viewport,
    store: &dyn MessageStore,
    zone: DisplayZone,
    clock: &dyn Clock,
) -> Option<StickyHeaderUpdate> {
    let headers = viewport.headers();
    if headers.is_empty() {
        return None;
    }

    let boundary = viewport.visible_top();
    let Some(idx) = find_sticky_header(&headers, boundary, STICKY_MARGIN) else {
        debug!(target: "scrollback.sticky", "No sticky header at boundary {}", boundary);
        return None;
    };
    let header = headers[idx];

    let message_id = viewport
        .message_at(header.bottom - ROW_PROBE_PADDING)
        .or_else(|| viewport.first_row_after_header(header.group_id));
    let Some(message_id) = message_id else {
        debug!(
            target: "scrollback.sticky",
            "No message row below sticky header {}",
            header.group_id
        );
        return None;
    };

    let Some(message) = store.get(message_id) else {
        error!(
            target: "scrollback.sticky",
            "Sticky header {} points at message {} which is not in the store",
            header.group_id,
            message_id
        );
        return None;
    };

    Some(StickyHeaderUpdate {
        group_id: header.group_id,
        message_id,
        date_label: dates::render_date(message.timestamp, None, zone, clock),
        hide_date_on_group: idx
            .checked_sub(1)
            .and_then(|prev| headers.get(prev))
            .map(|h| h.group_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::FixedClock;
    use crate::model::GroupIdAllocator;
    use crate::store::MemoryStore;
    use crate::test_utils::{FakeViewport, channel_message};
    use proptest::prelude::*;

    fn headers(tops: &[f64], height: f64) -> Vec<HeaderRect> {
        let mut ids = GroupIdAllocator::new();
        tops.iter()
            .map(|&top| HeaderRect {
                group_id: ids.next_id(),
                top,
                bottom: top + height,
            })
            .collect()
    }

    #[test]
    fn test_classify_band_edges() {
        let h = headers(&[0.0], 20.0)[0];
        assert_eq!(classify(&h, 0.0, 10.0), StickyClass::Sticky);
        assert_eq!(classify(&h, 0.9, 10.0), StickyClass::Sticky);
        assert_eq!(classify(&h, 1.5, 10.0), StickyClass::Above);
        assert_eq!(classify(&h, -30.0, 10.0), StickyClass::Sticky);
        assert_eq!(classify(&h, -31.0, 10.0), StickyClass::Below);
    }

    #[test]
    fn test_find_sticky_header() {
        let hs = headers(&[-400.0, -120.0, 55.0, 300.0, 900.0], 24.0);
        assert_eq!(find_sticky_header(&hs, 50.0, STICKY_MARGIN), Some(2));
        assert_eq!(find_sticky_header(&hs, 200.0, STICKY_MARGIN), None);
        assert_eq!(find_sticky_header(&[], 0.0, STICKY_MARGIN), None);
    }

    #[test]
    fn test_resolve_uses_row_under_header() {
        let store = MemoryStore::from_messages(vec![
            channel_message(1, 1_000, 1, "a", 5),
            channel_message(2, 200_000, 1, "b", 5),
        ]);
        let hs = headers(&[-300.0, 40.0], 30.0);
        let viewport = FakeViewport::new(40.0)
            .with_headers(hs.clone())
            .with_row(2, 60.0, 120.0);
        let clock = FixedClock::at_timestamp(200_000);

        let update = resolve_sticky_header(&viewport, &store, DisplayZone::UTC, &clock).unwrap();
        assert_eq!(update.group_id, hs[1].group_id);
        assert_eq!(update.message_id, MessageId::server(2));
        assert_eq!(update.date_label.text, "Today");
        assert_eq!(update.hide_date_on_group, Some(hs[0].group_id));
    }

    #[test]
    fn test_resolve_falls_back_to_next_row() {
        let store = MemoryStore::from_messages(vec![channel_message(1, 1_000, 1, "a", 5)]);
        let hs = headers(&[0.0], 30.0);
        let viewport = FakeViewport::new(0.0)
            .with_headers(hs.clone())
            .with_row_after(hs[0].group_id, 1);
        let clock = FixedClock::at_timestamp(200_000);

        let update = resolve_sticky_header(&viewport, &store, DisplayZone::UTC, &clock).unwrap();
        assert_eq!(update.message_id, MessageId::server(1));
        assert_eq!(update.hide_date_on_group, None);
    }

    #[test]
    fn test_resolve_aborts_on_unknown_message() {
        let store = MemoryStore::default();
        let hs = headers(&[0.0], 30.0);
        let viewport = FakeViewport::new(0.0)
            .with_headers(hs)
            .with_row(42, 0.0, 50.0);
        let clock = FixedClock::at_timestamp(0);
        assert!(resolve_sticky_header(&viewport, &store, DisplayZone::UTC, &clock).is_none());
    }

    #[test]
    fn test_resolve_without_headers_is_noop() {
        let store = MemoryStore::default();
        let viewport = FakeViewport::new(0.0);
        let clock = FixedClock::at_timestamp(0);
        assert!(resolve_sticky_header(&viewport, &store, DisplayZone::UTC, &clock).is_none());
    }

    fn arb_layout() -> impl Strategy<Value = (Vec<f64>, f64, f64)> {
        (
            prop::collection::vec(0u32..400, 0..40),
            10u32..40,
            -500i32..3000,
        )
            .prop_map(|(gaps, height, boundary)| {
                let height = f64::from(height);
                let mut top = -1000.0;
                let tops = gaps
                    .into_iter()
                    .map(|gap| {
                        // Consecutive headers never share the sticky band.
                        top += height + STICKY_MARGIN + 2.0 + f64::from(gap);
                        top
                    })
                    .collect();
                (tops, height, f64::from(boundary))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_binary_search_matches_linear_scan((tops, height, boundary) in arb_layout()) {
            let hs = headers(&tops, height);
            prop_assert_eq!(
                find_sticky_header(&hs, boundary, STICKY_MARGIN),
                linear_find_sticky_header(&hs, boundary, STICKY_MARGIN)
            );
        }
    }
}
