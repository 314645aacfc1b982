//! The orchestrating week calendar controller.
//!
//! [`WeekCalendarController`] owns the selection, the scroll tracker and the
//! settle scheduler and exposes a narrow surface to the host list:
//!
//! - [`on_scroll`](WeekCalendarController::on_scroll) for every scroll tick,
//! - [`on_scroll_state_changed`](WeekCalendarController::on_scroll_state_changed)
//!   and [`tick`](WeekCalendarController::tick) for settling,
//! - [`on_tap`](WeekCalendarController::on_tap) for taps inside a row,
//! - [`row`](WeekCalendarController::row) to build row view models.
//!
//! Work for the host (scrolls, label updates, announcements) is queued as
//! [`HostCommand`]s and drained with
//! [`take_commands`](WeekCalendarController::take_commands).
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    args::{DEFAULT_MAX_DATE, DEFAULT_MIN_DATE, WeekCalendarArgs},
    clock::{CalendarDate, Locale, parse_date, weekday_from_number},
    error::Result,
    metrics::Px,
    range_index::{DateRange, RangeIndex, pixel_to_date},
    row_model::{RowModelBuilder, RowViewModel},
    scroll_tracker::{ScrollPhase, ScrollSample, ScrollTracker},
    selection::{DateChangeListener, InvalidationListener, SelectedDay, SelectionStore},
    settle::SettleScheduler,
};

/// Duration of the smooth scroll used by animated [`go_to`] calls.
///
/// [`go_to`]: WeekCalendarController::go_to
pub const GOTO_SCROLL_DURATION: Duration = Duration::from_millis(1000);

/// Work the host list performs on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Jump so that `row` starts `top_offset` below the list top.
    ScrollToRow {
        /// Target row.
        row: usize,
        /// Offset of the row's top from the list top.
        top_offset: Px,
    },
    /// Animate so that `row` starts `top_offset` below the list top.
    SmoothScrollToRow {
        /// Target row.
        row: usize,
        /// Offset of the row's top from the list top.
        top_offset: Px,
        /// Animation duration.
        duration: Duration,
    },
    /// Animate a relative scroll.
    SmoothScrollBy {
        /// Distance to scroll.
        delta: Px,
        /// Animation duration.
        duration: Duration,
    },
    /// The month header text changed.
    MonthLabelChanged(String),
    /// Text to announce to accessibility services.
    Announce(String),
}

/// Persisted calendar state: the host list's opaque scroll state plus the
/// selected and focused dates in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedState<L> {
    /// Scroll state saved by the host list, if it had laid out any rows.
    pub list_state: Option<L>,
    /// Selected date.
    pub selected_date_millis: i64,
    /// First day of the focused month.
    pub focused_date_millis: i64,
}

/// One cell of the weekday header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Single-letter weekday label.
    pub label: String,
    /// Saturday or Sunday.
    pub is_weekend: bool,
}

/// The weekday header shown above the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNamesHeader {
    /// Whether the header reserves a week-number column.
    pub show_week_number: bool,
    /// Seven cells starting at the first day of the week.
    pub cells: SmallVec<[HeaderCell; 7]>,
}

/// Infinite week-grid calendar state.
pub struct WeekCalendarController {
    time_zone: Tz,
    locale: Locale,
    follows_locale_week: bool,
    show_week_number: bool,
    shown_week_count: usize,
    enabled: bool,
    list_scroll_top_offset: Px,
    bottom_buffer: Px,
    selection: SelectionStore,
    tracker: ScrollTracker,
    settle: SettleScheduler,
    first_day_of_month: CalendarDate,
    current_month_displayed: u32,
    month_label: String,
    viewport: Option<ScrollSample>,
    commands: Vec<HostCommand>,
}

fn parse_or_default(text: &str, default: &str, tz: Tz) -> CalendarDate {
    if let Some(date) = parse_date(text, tz) {
        return date;
    }
    if !text.is_empty() {
        warn!(date = text, format = "MM/dd/yyyy", "unparsable calendar date, using {default}");
    }
    parse_date(default, tz).unwrap_or_else(|| CalendarDate::at_start_of_day(NaiveDate::default(), tz))
}

impl WeekCalendarController {
    /// Creates a controller from `args`.
    ///
    /// Fails with [`CalendarError::InvalidRange`](crate::CalendarError::InvalidRange)
    /// when the configured max date precedes the min date.
    pub fn new(args: WeekCalendarArgs) -> Result<Self> {
        Self::new_at(args, Instant::now())
    }

    /// Like [`new`](Self::new) with an explicit clock reading.
    pub fn new_at(args: WeekCalendarArgs, now: Instant) -> Result<Self> {
        let tz = args.time_zone;
        let min = parse_or_default(&args.min_date, DEFAULT_MIN_DATE, tz);
        let max = parse_or_default(&args.max_date, DEFAULT_MAX_DATE, tz);
        let range = DateRange::new(min, max)?;
        let first_day_of_week = args
            .first_day_of_week
            .unwrap_or_else(|| args.locale.first_day_of_week());
        let selection = SelectionStore::new(RangeIndex::new(range, first_day_of_week), min)?;

        let mut controller = Self {
            time_zone: tz,
            follows_locale_week: args.first_day_of_week.is_none(),
            month_label: args.locale.format_month(&min),
            locale: args.locale,
            show_week_number: args.show_week_number,
            shown_week_count: args.shown_week_count.max(1),
            enabled: true,
            list_scroll_top_offset: args.list_scroll_top_offset.to_px(),
            bottom_buffer: args.bottom_buffer.to_px(),
            selection,
            tracker: ScrollTracker::new(args.week_min_visible_height.to_px()),
            settle: SettleScheduler::new(args.list_scroll_top_offset.to_px()),
            first_day_of_month: min.with_day_of_month(1),
            current_month_displayed: min.month0(),
            viewport: None,
            commands: Vec::new(),
        };

        if args.set_initial_date {
            let millis = args
                .initial_date_millis
                .unwrap_or_else(|| CalendarDate::now(tz).epoch_millis());
            controller.set_date(millis, now)?;
        }
        Ok(controller)
    }

    /// Registers the single selection listener.
    pub fn set_on_date_change(&mut self, listener: Option<DateChangeListener>) {
        self.selection.set_on_date_change(listener);
    }

    /// Registers the single row invalidation listener.
    pub fn set_on_rows_invalidated(&mut self, listener: Option<InvalidationListener>) {
        self.selection.set_on_invalidated(listener);
    }

    /// Drains the queued host commands.
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    fn index(&self) -> &RangeIndex {
        self.selection.index()
    }

    fn range(&self) -> DateRange {
        *self.selection.index().range()
    }

    fn row_builder(&self) -> RowModelBuilder<'_> {
        RowModelBuilder::new(self.selection.index(), &self.locale, self.show_week_number)
    }

    /// Number of week rows.
    pub fn total_rows(&self) -> usize {
        self.selection.total_rows()
    }

    /// Row generation; changes whenever every row must be rebuilt.
    pub fn generation(&self) -> u64 {
        self.selection.generation()
    }

    /// Builds the view model of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not below [`total_rows`](Self::total_rows).
    pub fn row(&self, row: usize, row_width: Option<Px>) -> RowViewModel {
        let selected = self.selection.selected();
        self.row_builder()
            .build(row, Some(&selected), self.selection.focused_month(), row_width)
    }

    /// The weekday header.
    pub fn day_names_header(&self) -> DayNamesHeader {
        let mut cells = SmallVec::new();
        let mut day = self.index().first_day_of_week();
        for _ in 0..7 {
            let label = self
                .locale
                .short_weekday_name(day)
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            cells.push(HeaderCell {
                label,
                is_weekend: matches!(day, Weekday::Sat | Weekday::Sun),
            });
            day = day.succ();
        }
        DayNamesHeader {
            show_week_number: self.show_week_number,
            cells,
        }
    }

    /// Current month header text.
    pub fn month_label(&self) -> &str {
        &self.month_label
    }

    /// Month (0-11) currently shown in the header.
    pub fn current_month_displayed(&self) -> u32 {
        self.current_month_displayed
    }

    /// Focused month used for row highlighting, 0-11.
    pub fn focused_month(&self) -> u32 {
        self.selection.focused_month()
    }

    /// The selected day.
    pub fn selected_day(&self) -> SelectedDay {
        SelectedDay::from(&self.selection.selected())
    }

    /// Selected date in epoch milliseconds.
    pub fn date(&self) -> i64 {
        self.selection.selected().epoch_millis()
    }

    /// First day of the focused month in epoch milliseconds.
    pub fn focused_date(&self) -> i64 {
        self.first_day_of_month.epoch_millis()
    }

    /// First supported date in epoch milliseconds.
    pub fn min_date(&self) -> i64 {
        self.range().min().epoch_millis()
    }

    /// Last supported date in epoch milliseconds.
    pub fn max_date(&self) -> i64 {
        self.range().max().epoch_millis()
    }

    /// The day each row starts on.
    pub fn first_day_of_week(&self) -> Weekday {
        self.index().first_day_of_week()
    }

    /// Whether rows show week numbers.
    pub fn show_week_number(&self) -> bool {
        self.show_week_number
    }

    /// Number of rows the list shows at once.
    pub fn shown_week_count(&self) -> usize {
        self.shown_week_count
    }

    /// The zone calendar days are computed in.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// The active locale.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Whether taps are accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables taps.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// When the host should call [`tick`](Self::tick) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.settle.next_deadline()
    }

    /// Selects `millis`, clamped to the range, scrolling only when the date
    /// is not fully visible.
    pub fn set_date(&mut self, millis: i64, now: Instant) -> Result<()> {
        self.set_date_with(millis, false, false, now)
    }

    /// Selects `millis`, clamped to the range. `animate` smooth-scrolls and
    /// `center` scrolls even when the date is already visible.
    pub fn set_date_with(
        &mut self,
        millis: i64,
        animate: bool,
        center: bool,
        now: Instant,
    ) -> Result<()> {
        let date = CalendarDate::from_epoch_millis(millis, self.time_zone)?;
        let date = self.range().clamp(date);
        self.go_to(date, animate, true, center, now)
    }

    /// Moves the list to `date`.
    ///
    /// The date must already be inside the range; otherwise this fails with
    /// [`CalendarError::DateOutOfRange`](crate::CalendarError::DateOutOfRange).
    /// When the date's row is not fully visible, or `force_scroll` is set,
    /// the list scrolls so that the row holding the 1st of the date's month
    /// rests at the top offset.
    pub fn go_to(
        &mut self,
        date: CalendarDate,
        animate: bool,
        set_selected: bool,
        force_scroll: bool,
        now: Instant,
    ) -> Result<()> {
        self.range().check(&date)?;
        let (first_visible, last_visible) = self.fully_visible_rows();

        if set_selected {
            self.selection.set_selected_day(date, false)?;
        }

        let position = self.index().row_index_of(&date);
        if position < first_visible || position > last_visible || force_scroll {
            let first_of_month = date.with_day_of_month(1);
            self.set_month_displayed(first_of_month, false);
            let row = self.index().row_index_of(&first_of_month);

            self.tracker.state_mut().previous_phase = ScrollPhase::Settling;
            let top_offset = self.list_scroll_top_offset;
            if animate {
                self.commands.push(HostCommand::SmoothScrollToRow {
                    row,
                    top_offset,
                    duration: GOTO_SCROLL_DURATION,
                });
            } else {
                self.commands
                    .push(HostCommand::ScrollToRow { row, top_offset });
                self.on_scroll_state_changed(ScrollPhase::Idle, now);
            }
        } else if set_selected {
            self.set_month_displayed(date, false);
        }
        Ok(())
    }

    fn fully_visible_rows(&self) -> (usize, usize) {
        let Some(viewport) = self.viewport else {
            return (0, self.shown_week_count - 1);
        };
        let top = viewport.row_top();
        let mut first = viewport.first_visible_row;
        if top < Px::ZERO {
            first += 1;
        }
        let mut last = first + self.shown_week_count - 1;
        if top > self.bottom_buffer {
            last = last.saturating_sub(1);
        }
        (first, last)
    }

    /// Updates the header, the focused month and the month anchor together.
    fn set_month_displayed(&mut self, date: CalendarDate, announce: bool) {
        let label = self.locale.format_month(&date);
        if label != self.month_label {
            debug!(month = %label, "calendar month displayed changed");
            self.month_label = label.clone();
            self.commands.push(HostCommand::MonthLabelChanged(label));
        }
        if announce {
            self.commands
                .push(HostCommand::Announce(self.month_label.clone()));
        }
        self.first_day_of_month = date.with_day_of_month(1);
        self.current_month_displayed = date.month0();
        self.selection.set_focus_month(self.current_month_displayed);
    }

    /// Feeds one scroll tick from the host list.
    pub fn on_scroll(&mut self, sample: ScrollSample) {
        self.viewport = Some(sample);
        let builder =
            RowModelBuilder::new(self.selection.index(), &self.locale, self.show_week_number);
        let transition = self.tracker.on_scroll(
            sample,
            self.current_month_displayed,
            self.selection.total_rows(),
            |row| builder.row_months(row),
        );
        if let Some(transition) = transition {
            self.set_month_displayed(transition.anchor, true);
        }
    }

    /// Records a scroll phase change from the host list. The settle decision
    /// runs from [`tick`](Self::tick) once the phase has been stable for
    /// [`SCROLL_CHANGE_DELAY`](crate::settle::SCROLL_CHANGE_DELAY).
    pub fn on_scroll_state_changed(&mut self, phase: ScrollPhase, now: Instant) {
        self.settle.on_scroll_state_changed(phase, now);
    }

    /// Runs a due settle decision, queueing a corrective scroll if needed.
    pub fn tick(&mut self, now: Instant) {
        let correction = self
            .settle
            .poll(now, self.tracker.state_mut(), self.viewport);
        if let Some(correction) = correction {
            self.commands.push(HostCommand::SmoothScrollBy {
                delta: correction.delta,
                duration: correction.duration,
            });
        }
    }

    /// Handles a tap at horizontal position `x` inside `row`.
    ///
    /// Returns true when the tap selected a new day.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not below [`total_rows`](Self::total_rows).
    pub fn on_tap(&mut self, row: usize, x: f32, row_width: Px) -> bool {
        if !self.enabled {
            return false;
        }
        let first_day = self.index().first_day_of_row(row);
        let num_cells = self.row_builder().num_cells();
        let Some(day) = pixel_to_date(x, &first_day, row_width, num_cells, self.show_week_number)
        else {
            return false;
        };
        if !self.range().contains(&day) {
            return false;
        }
        let day = day.with_time_of_day_from(&self.selection.selected());
        let changed = matches!(self.selection.set_selected_day(day, true), Ok(true));
        if changed {
            self.commands
                .push(HostCommand::Announce(self.locale.format_date(&day)));
        }
        self.set_month_displayed(day, false);
        changed
    }

    /// Changes the first supported date. Re-homes the selection to the new
    /// bound when it falls before it.
    pub fn set_min_date(&mut self, millis: i64, now: Instant) -> Result<()> {
        let min = CalendarDate::from_epoch_millis(millis, self.time_zone)?;
        let range = self.range();
        if min.same_day(&range.min()) {
            return Ok(());
        }
        self.selection.set_range(min, range.max())?;
        self.reconfigured("min date");
        if self.selection.selected().is_before_day(&min) {
            self.go_to(min, false, true, false, now)?;
        }
        Ok(())
    }

    /// Changes the last supported date. Re-homes the selection to the new
    /// bound when it falls after it.
    pub fn set_max_date(&mut self, millis: i64, now: Instant) -> Result<()> {
        let max = CalendarDate::from_epoch_millis(millis, self.time_zone)?;
        let range = self.range();
        if max.same_day(&range.max()) {
            return Ok(());
        }
        self.selection.set_range(range.min(), max)?;
        self.reconfigured("max date");
        if self.selection.selected().is_after_day(&max) {
            self.go_to(max, false, true, false, now)?;
        }
        Ok(())
    }

    /// Changes the day each row starts on.
    pub fn set_first_day_of_week(&mut self, first_day_of_week: Weekday) {
        self.follows_locale_week = false;
        if self.index().first_day_of_week() == first_day_of_week {
            return;
        }
        self.selection.set_first_day_of_week(first_day_of_week);
        self.reconfigured("first day of week");
    }

    /// Changes the first day of the week from its number (Sunday = 1).
    pub fn set_first_day_of_week_number(&mut self, number: i32) -> Result<()> {
        self.set_first_day_of_week(weekday_from_number(number)?);
        Ok(())
    }

    /// Shows or hides the week-number cell.
    pub fn set_show_week_number(&mut self, show_week_number: bool) {
        if self.show_week_number == show_week_number {
            return;
        }
        self.show_week_number = show_week_number;
        self.reconfigured("week number");
    }

    /// Replaces the locale. Without an explicit first day of the week, rows
    /// follow the new locale's convention.
    pub fn set_locale(&mut self, locale: Locale) {
        if self.locale == locale {
            return;
        }
        let first_day_of_week = locale.first_day_of_week();
        self.locale = locale;
        if self.follows_locale_week && self.index().first_day_of_week() != first_day_of_week {
            self.selection.set_first_day_of_week(first_day_of_week);
        }
        self.reconfigured("locale");
        let anchor = self.first_day_of_month;
        self.set_month_displayed(anchor, false);
    }

    /// Moves the calendar to another zone.
    ///
    /// Range endpoints keep their calendar days; the selection and the
    /// focused month keep their instants and are re-clamped to the range.
    pub fn set_time_zone(&mut self, tz: Tz) -> Result<()> {
        if self.time_zone == tz {
            return Ok(());
        }
        let range = self.range();
        let selected = self.selection.selected().in_time_zone(tz);
        let focused = self.first_day_of_month.in_time_zone(tz);

        self.time_zone = tz;
        self.selection.set_range(
            range.min().with_local_fields_in(tz),
            range.max().with_local_fields_in(tz),
        )?;
        self.selection.replace_selected(selected);
        self.first_day_of_month = focused;
        self.reconfigured("time zone");
        self.set_current_date(selected, focused)
    }

    fn reconfigured(&mut self, what: &str) {
        debug!(what, "calendar reconfigured");
        self.settle.cancel();
        self.tracker.reset();
        self.selection.invalidate();
    }

    /// Re-homes the selection and focus without scrolling.
    fn set_current_date(&mut self, selected: CalendarDate, focused: CalendarDate) -> Result<()> {
        let range = self.range();
        if selected.is_before_day(&range.min()) {
            self.selection.set_selected_day(range.min(), false)?;
            self.set_month_displayed(range.min(), false);
        } else if selected.is_after_day(&range.max()) {
            self.selection.set_selected_day(range.max(), false)?;
            self.set_month_displayed(range.max(), false);
        } else {
            self.selection.set_selected_day(selected, false)?;
            self.set_month_displayed(focused, false);
        }
        Ok(())
    }

    /// Captures the persisted state. `list_state` is the host list's own
    /// scroll state, or `None` if the list never laid out a row.
    pub fn save_state<L>(&self, list_state: Option<L>) -> SavedState<L> {
        SavedState {
            list_state,
            selected_date_millis: self.date(),
            focused_date_millis: self.focused_date(),
        }
    }

    /// Restores persisted state.
    ///
    /// With a list state, the selection and focus are re-homed without
    /// scrolling and the list state is handed back for the host to restore
    /// verbatim. Without one, the selected date is re-selected and the list
    /// is scrolled to it.
    pub fn restore_state<L>(&mut self, saved: SavedState<L>, now: Instant) -> Result<Option<L>> {
        let selected = CalendarDate::from_epoch_millis(saved.selected_date_millis, self.time_zone)?;
        match saved.list_state {
            Some(list_state) => {
                let focused =
                    CalendarDate::from_epoch_millis(saved.focused_date_millis, self.time_zone)?;
                self.set_current_date(selected, focused)?;
                Ok(Some(list_state))
            }
            None => {
                let selected = self.range().clamp(selected);
                self.go_to(selected, false, true, true, now)?;
                Ok(None)
            }
        }
    }
}
