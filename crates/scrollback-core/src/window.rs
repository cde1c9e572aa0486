//! The render window: which slice of the full message list is materialized.

use crate::ports::FetchStatus;
use std::ops::Range;
use tracing::trace;

/// Half-open index range `[start, end)` into the host's message list.
///
/// Invariant: `start <= end` and `end - start <= window_size`. After
/// `update` the range also lies within `[0, total]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderWindow {
    start: usize,
    end: usize,
    window_size: usize,
    threshold: usize,
}

impl RenderWindow {
    pub fn new(window_size: usize, threshold: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            window_size: window_size.max(1),
            threshold,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Center the window on `selected`. With `check_for_changed`, returns
    /// false without touching anything when the start would not move.
    /// Out-of-range selections are clamped.
    pub fn update(&mut self, selected: usize, total: usize, check_for_changed: bool) -> bool {
        let selected = selected.min(total.saturating_sub(1));
        let new_start = selected.saturating_sub(self.window_size / 2).min(total);
        if check_for_changed && new_start == self.start {
            return false;
        }

        self.start = new_start;
        self.end = new_start.saturating_add(self.window_size).min(total);
        trace!(
            target: "scrollback.window",
            "Render window now [{}, {}) of {} around {}",
            self.start,
            self.end,
            total,
            selected
        );
        true
    }

    /// The selection drifted close to a window edge that is not also an edge
    /// of the whole list.
    pub fn needs_rerender(&self, selected: usize, total: usize) -> bool {
        let near_top = (selected < self.start || selected - self.start < self.threshold)
            && self.start != 0;
        let near_bottom = self.end.saturating_sub(selected) <= self.threshold && self.end != total;
        near_top || near_bottom
    }

    pub fn should_fetch_older(&self, selected: usize, status: FetchStatus) -> bool {
        self.start == 0 && selected < self.threshold && !status.has_found_oldest()
    }

    pub fn should_fetch_newer(&self, selected: usize, total: usize, status: FetchStatus) -> bool {
        self.end == total
            && total.saturating_sub(selected) <= self.threshold
            && !status.has_found_newest()
    }

    /// `incoming` messages were appended to the list, which held
    /// `total_before` messages. Returns how many of them (from the front of
    /// the batch) fit into the window and extends it accordingly.
    pub fn reserve_bottom(&mut self, incoming: usize, total_before: usize) -> usize {
        if self.end != total_before || self.len() >= self.window_size {
            return 0;
        }
        let fit = incoming.min(self.window_size - self.len());
        self.end += fit;
        fit
    }

    /// `incoming` messages were inserted before index 0. Shifts the window
    /// to keep covering the same messages, then grows it upwards as far as
    /// the budget allows. Returns how many of the new messages (from the back
    /// of the batch) now fall inside the window.
    pub fn shift_for_prepend(&mut self, incoming: usize) -> usize {
        let was_at_top = self.start == 0;
        self.start += incoming;
        self.end += incoming;
        if !was_at_top || self.len() >= self.window_size {
            return 0;
        }
        let fit = incoming.min(self.window_size - self.len());
        self.start -= fit;
        fit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_update_centers_and_clamps() {
        let mut w = RenderWindow::new(250, 50);
        assert!(w.update(10, 1000, false));
        assert_eq!(w.range(), 0..250);

        assert!(w.update(500, 1000, true));
        assert_eq!(w.range(), 375..625);

        assert!(w.update(990, 1000, true));
        assert_eq!(w.range(), 865..1000);

        assert!(w.update(5000, 100, false), "out of range selection clamps");
        assert_eq!(w.range(), 0..100);
    }

    #[test]
    fn test_update_reports_unchanged_start() {
        let mut w = RenderWindow::new(250, 50);
        w.update(500, 1000, false);
        assert!(!w.update(500, 1000, true));
        assert!(w.update(500, 1000, false));
    }

    #[test]
    fn test_needs_rerender_ignores_absolute_edges() {
        let mut w = RenderWindow::new(250, 50);
        w.update(10, 1000, false);
        assert!(!w.needs_rerender(5, 1000), "top of window is top of list");
        assert!(w.needs_rerender(220, 1000), "close to bottom edge");

        w.update(990, 1000, false);
        assert!(!w.needs_rerender(995, 1000), "bottom of window is end of list");
        assert!(w.needs_rerender(870, 1000));
        assert!(!w.needs_rerender(950, 1000));
    }

    #[test]
    fn test_needs_rerender_when_selection_leaves_window() {
        let mut w = RenderWindow::new(10, 0);
        w.update(50, 100, false);
        assert_eq!(w.range(), 45..55);
        assert!(w.needs_rerender(5, 100), "selection above the window");
        assert!(w.needs_rerender(80, 100), "selection below the window");
        assert!(!w.needs_rerender(50, 100));
    }

    #[test]
    fn test_fetch_signals() {
        let mut w = RenderWindow::new(250, 50);
        w.update(10, 100, false);
        let nothing_found = FetchStatus::default();
        assert!(w.should_fetch_older(10, nothing_found));
        assert!(!w.should_fetch_older(60, nothing_found));
        assert!(!w.should_fetch_older(
            10,
            FetchStatus {
                found_oldest: true,
                found_newest: false
            }
        ));
        assert!(w.should_fetch_newer(60, 100, nothing_found));
        assert!(!w.should_fetch_newer(10, 100, nothing_found));
    }

    #[test]
    fn test_reserve_bottom_respects_budget() {
        let mut w = RenderWindow::new(10, 2);
        w.update(0, 7, false);
        assert_eq!(w.range(), 0..7);
        assert_eq!(w.reserve_bottom(5, 7), 3);
        assert_eq!(w.range(), 0..10);
        assert_eq!(w.reserve_bottom(5, 12), 0, "window is full");
    }

    #[test]
    fn test_reserve_bottom_skips_detached_window() {
        let mut w = RenderWindow::new(10, 2);
        w.update(0, 7, false);
        assert_eq!(w.reserve_bottom(1, 9), 0);
        assert_eq!(w.range(), 0..7);
    }

    #[test]
    fn test_shift_for_prepend() {
        let mut w = RenderWindow::new(10, 2);
        w.update(0, 6, false);
        assert_eq!(w.shift_for_prepend(8), 4);
        assert_eq!(w.range(), 4..14);

        let mut w = RenderWindow::new(10, 2);
        w.update(50, 100, false);
        assert_eq!(w.shift_for_prepend(3), 0);
        assert_eq!(w.range(), 48..58);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_window_stays_in_bounds(
            total in 0usize..2000,
            size in 1usize..400,
            steps in prop::collection::vec((0usize..2000, any::<bool>()), 1..30),
        ) {
            let mut w = RenderWindow::new(size, size / 5);
            for (idx, check) in steps {
                let idx = if total == 0 { 0 } else { idx % total };
                w.update(idx, total, check);
                prop_assert!(w.start() <= w.end());
                prop_assert!(w.end() <= total);
                prop_assert!(w.len() <= size);
                if total > 0 && !check {
                    prop_assert!(w.range().contains(&idx));
                }
            }
        }

        #[test]
        fn prop_selection_outside_window_needs_rerender(
            total in 1usize..2000,
            size in 1usize..400,
            threshold in 0usize..400,
            center in 0usize..2000,
            selected in 0usize..2000,
        ) {
            prop_assume!(threshold < size);
            let mut w = RenderWindow::new(size, threshold);
            w.update(center % total, total, false);
            let selected = selected % total;
            if !w.range().contains(&selected) {
                prop_assert!(w.needs_rerender(selected, total));
            }
        }
    }
}
