//! Scroll direction and month-boundary tracking.
//!
//! The host list reports a [`ScrollSample`] on every scroll tick. The tracker
//! infers the scroll direction from the change in absolute scroll position,
//! samples a row a little past the leading edge (the hysteresis rows) and
//! reports a [`MonthTransition`] when that row belongs to the next month in
//! the direction of travel. The decision depends only on the visible rows,
//! never on elapsed time, so flings and slow drags behave identically.
use tracing::trace;

use crate::{clock::CalendarDate, metrics::Px, row_model::RowMonths};

/// Rows skipped past the top edge before sampling while scrolling up.
pub const HYSTERESIS_ROWS: usize = 2;

/// Scroll phases reported by the host list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPhase {
    /// Not moving.
    #[default]
    Idle,
    /// Following the user's finger.
    Dragging,
    /// Moving on its own after a fling or a programmatic scroll.
    Settling,
}

/// Geometry of the list's first visible row at one scroll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSample {
    /// Index of the first (possibly partially) visible row.
    pub first_visible_row: usize,
    /// Height of one row.
    pub row_height: Px,
    /// Bottom edge of the first visible row relative to the list top.
    pub row_bottom: Px,
}

impl ScrollSample {
    /// Absolute scroll position in pixels.
    pub fn scroll_position(&self) -> i64 {
        self.first_visible_row as i64 * self.row_height.to_i64() - self.row_bottom.to_i64()
    }

    /// Top edge of the first visible row; negative when partially hidden.
    pub fn row_top(&self) -> Px {
        self.row_bottom - self.row_height
    }
}

/// Direction and phase bookkeeping of one calendar instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollDirectionState {
    /// Scroll position of the last sample that moved.
    pub last_scroll_position: i64,
    /// Direction of the last movement.
    pub is_scrolling_up: bool,
    /// Phase before the most recent settled phase change.
    pub previous_phase: ScrollPhase,
    /// Phase most recently applied by the settle scheduler.
    pub current_phase: ScrollPhase,
}

/// A month-boundary crossing detected while scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTransition {
    /// A date inside the newly displayed month.
    pub anchor: CalendarDate,
    /// Direction that caused the transition.
    pub scrolling_up: bool,
}

/// Month difference from `displayed` to `month`, wrapping December and
/// January to ±1.
pub fn month_diff(displayed: u32, month: u32) -> i32 {
    match (displayed, month) {
        (11, 0) => 1,
        (0, 11) => -1,
        _ => month as i32 - displayed as i32,
    }
}

/// Turns raw scroll samples into month transitions.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    state: ScrollDirectionState,
    week_min_visible_height: Px,
}

impl ScrollTracker {
    /// Creates a tracker. A first row showing less than
    /// `week_min_visible_height` pixels is skipped when sampling.
    pub fn new(week_min_visible_height: Px) -> Self {
        Self {
            state: ScrollDirectionState::default(),
            week_min_visible_height,
        }
    }

    /// Current direction state.
    pub fn state(&self) -> &ScrollDirectionState {
        &self.state
    }

    /// Mutable direction state, shared with the settle scheduler.
    pub fn state_mut(&mut self) -> &mut ScrollDirectionState {
        &mut self.state
    }

    /// Forgets all direction history.
    pub fn reset(&mut self) {
        self.state = ScrollDirectionState::default();
    }

    /// Processes one sample.
    ///
    /// `row_months` resolves a row index to its month attribution; the
    /// sampled row is clamped to `total_rows - 1` when the hysteresis skip
    /// runs past the last row.
    pub fn on_scroll<F>(
        &mut self,
        sample: ScrollSample,
        displayed_month: u32,
        total_rows: usize,
        row_months: F,
    ) -> Option<MonthTransition>
    where
        F: FnOnce(usize) -> RowMonths,
    {
        let position = sample.scroll_position();
        if position == self.state.last_scroll_position {
            return None;
        }
        let scrolling_up = position < self.state.last_scroll_position;
        self.state.is_scrolling_up = scrolling_up;

        let sliver = usize::from(sample.row_bottom < self.week_min_visible_height);
        let skip = if scrolling_up {
            HYSTERESIS_ROWS + sliver
        } else {
            sliver
        };
        let row = (sample.first_visible_row + skip).min(total_rows.saturating_sub(1));
        let months = row_months(row);

        let month = if scrolling_up {
            months.month_of_first_day
        } else {
            months.month_of_last_day
        };
        let diff = month_diff(displayed_month, month);
        trace!(position, scrolling_up, row, month, diff, "calendar scroll sample");

        let transition = ((!scrolling_up && diff > 0) || (scrolling_up && diff < 0)).then(|| {
            let step = if scrolling_up { -7 } else { 7 };
            MonthTransition {
                anchor: months.first_day.add_days(step),
                scrolling_up,
            }
        });

        self.state.last_scroll_position = position;
        self.state.previous_phase = self.state.current_phase;
        transition
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::Tz;

    use super::*;
    use crate::clock::parse_date;

    fn months(first_day: &str, first: u32, last: u32) -> RowMonths {
        RowMonths {
            first_day: parse_date(first_day, Tz::UTC).unwrap(),
            month_of_first_day: first,
            month_of_last_day: last,
        }
    }

    fn sample(first_visible_row: usize, row_bottom: i32) -> ScrollSample {
        ScrollSample {
            first_visible_row,
            row_height: Px(100),
            row_bottom: Px(row_bottom),
        }
    }

    #[test]
    fn scroll_position_accounts_for_partial_first_row() {
        assert_eq!(sample(3, 40).scroll_position(), 260);
        assert_eq!(sample(3, 40).row_top(), Px(-60));
    }

    #[test]
    fn month_diff_wraps_year_boundaries() {
        assert_eq!(month_diff(11, 0), 1);
        assert_eq!(month_diff(0, 11), -1);
        assert_eq!(month_diff(4, 6), 2);
        assert_eq!(month_diff(6, 4), -2);
    }

    #[test]
    fn december_to_january_advances_when_scrolling_down() {
        let mut tracker = ScrollTracker::new(Px(12));
        let transition = tracker
            .on_scroll(sample(10, 90), 11, 100, |row| {
                assert_eq!(row, 10);
                months("12/27/1970", 0, 0)
            })
            .expect("transition");
        assert!(!transition.scrolling_up);
        assert_eq!(transition.anchor.day(), parse_date("01/03/1971", Tz::UTC).unwrap().day());
        assert!(!tracker.state().is_scrolling_up);
        assert_eq!(tracker.state().last_scroll_position, 910);
    }

    #[test]
    fn unchanged_position_is_ignored() {
        let mut tracker = ScrollTracker::new(Px(12));
        tracker.on_scroll(sample(10, 90), 0, 100, |_| months("03/01/1970", 1, 2));
        let state = *tracker.state();
        let result = tracker.on_scroll(sample(10, 90), 0, 100, |_| {
            panic!("rows are not sampled without movement")
        });
        assert_eq!(result, None);
        assert_eq!(*tracker.state(), state);
    }

    #[test]
    fn scrolling_up_samples_past_hysteresis_rows() {
        let mut tracker = ScrollTracker::new(Px(12));
        tracker.state_mut().last_scroll_position = 10_000;
        let transition = tracker.on_scroll(sample(20, 50), 5, 100, |row| {
            assert_eq!(row, 20 + HYSTERESIS_ROWS);
            months("05/31/1970", 4, 5)
        });
        let transition = transition.expect("transition");
        assert!(transition.scrolling_up);
        assert_eq!(
            transition.anchor.day(),
            parse_date("05/24/1970", Tz::UTC).unwrap().day()
        );
    }

    #[test]
    fn sliver_rows_add_one_more_skip() {
        let mut tracker = ScrollTracker::new(Px(12));
        tracker.on_scroll(sample(7, 5), 0, 100, |row| {
            assert_eq!(row, 8);
            months("02/22/1970", 1, 1)
        });
        tracker.on_scroll(sample(6, 5), 1, 100, |row| {
            assert_eq!(row, 6 + HYSTERESIS_ROWS + 1);
            months("02/22/1970", 1, 1)
        });
    }

    #[test]
    fn diff_against_direction_is_rejected() {
        let mut tracker = ScrollTracker::new(Px(12));
        // Moving down but the sampled row reports an earlier month.
        let down = tracker.on_scroll(sample(10, 90), 6, 100, |_| months("06/28/1970", 5, 5));
        assert_eq!(down, None);
        // Moving up but the sampled row reports a later month.
        let up = tracker.on_scroll(sample(9, 90), 6, 100, |_| months("07/26/1970", 7, 7));
        assert_eq!(up, None);
        assert!(tracker.state().is_scrolling_up);
    }

    #[test]
    fn sampled_row_is_clamped_to_last_row() {
        let mut tracker = ScrollTracker::new(Px(12));
        tracker.state_mut().last_scroll_position = i64::MAX;
        tracker.on_scroll(sample(9, 80), 0, 10, |row| {
            assert_eq!(row, 9);
            months("01/04/1970", 0, 0)
        });
    }

    #[test]
    fn sample_copies_current_phase_into_previous() {
        let mut tracker = ScrollTracker::new(Px(12));
        tracker.state_mut().current_phase = ScrollPhase::Dragging;
        tracker.on_scroll(sample(1, 50), 0, 100, |_| months("01/04/1970", 0, 0));
        assert_eq!(tracker.state().previous_phase, ScrollPhase::Dragging);
    }
}
