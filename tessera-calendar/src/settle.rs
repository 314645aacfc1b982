//! Debounced settling of the week list.
//!
//! Scroll-phase changes arrive in bursts while a fling decays. Each change
//! reschedules a single pending settle decision [`SCROLL_CHANGE_DELAY`] into
//! the future; when it finally fires on an idle list, a partially visible
//! first row is snapped into alignment with a short smooth scroll.
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    metrics::Px,
    scroll_tracker::{ScrollDirectionState, ScrollPhase, ScrollSample},
};

/// Quiet period before a scroll-phase change is acted upon.
pub const SCROLL_CHANGE_DELAY: Duration = Duration::from_millis(40);

/// Duration of the alignment smooth scroll.
pub const ADJUSTMENT_SCROLL_DURATION: Duration = Duration::from_millis(500);

/// A cancelable delayed value. Scheduling replaces whatever was pending.
#[derive(Debug, Clone)]
pub struct DebounceTimer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> DebounceTimer<T> {
    /// Creates an idle timer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedules `value` for `now + delay`, superseding any pending value.
    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Drops the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// When the pending value fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }
}

/// A corrective scroll for the host list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleCorrection {
    /// Distance to scroll; negative scrolls content back down.
    pub delta: Px,
    /// Animation duration.
    pub duration: Duration,
}

/// Scroll delta that aligns the first visible row with the top offset.
///
/// Returns `None` when the row's bottom edge is within `top_offset` of the
/// resting position already.
pub fn settle_delta(
    row_bottom: Px,
    row_height: Px,
    top_offset: Px,
    scrolling_up: bool,
) -> Option<Px> {
    let dist_from_top = row_bottom - top_offset;
    if dist_from_top <= top_offset {
        return None;
    }
    Some(if scrolling_up {
        dist_from_top - row_height
    } else {
        dist_from_top
    })
}

/// Debounces scroll-phase changes and computes settle corrections.
#[derive(Debug, Clone)]
pub struct SettleScheduler {
    timer: DebounceTimer<ScrollPhase>,
    list_scroll_top_offset: Px,
}

impl SettleScheduler {
    /// Creates a scheduler aligning rows to `list_scroll_top_offset`.
    pub fn new(list_scroll_top_offset: Px) -> Self {
        Self {
            timer: DebounceTimer::new(SCROLL_CHANGE_DELAY),
            list_scroll_top_offset,
        }
    }

    /// Records a phase change reported by the host list.
    pub fn on_scroll_state_changed(&mut self, phase: ScrollPhase, now: Instant) {
        self.timer.schedule(now, phase);
    }

    /// Cancels the pending settle decision.
    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }

    /// When the host should call [`poll`](Self::poll) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Runs the pending decision if it is due.
    ///
    /// `first_row` is the geometry of the first visible row at the time of
    /// the call; without it the decision is dropped and the previous phase
    /// is left untouched.
    pub fn poll(
        &mut self,
        now: Instant,
        state: &mut ScrollDirectionState,
        first_row: Option<ScrollSample>,
    ) -> Option<SettleCorrection> {
        let phase = self.timer.poll(now)?;
        state.current_phase = phase;

        let mut correction = None;
        if phase == ScrollPhase::Idle && state.previous_phase != ScrollPhase::Idle {
            let row = first_row?;
            correction = settle_delta(
                row.row_bottom,
                row.row_height,
                self.list_scroll_top_offset,
                state.is_scrolling_up,
            )
            .map(|delta| SettleCorrection {
                delta,
                duration: ADJUSTMENT_SCROLL_DURATION,
            });
            if let Some(correction) = correction {
                debug!(delta = correction.delta.raw(), "calendar settle correction");
            }
        }
        state.previous_phase = phase;
        correction
    }
}
