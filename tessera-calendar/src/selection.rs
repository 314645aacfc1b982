//! Selected day and focused month.
use std::sync::Arc;

use chrono::Weekday;
use tracing::debug;

use crate::{
    clock::CalendarDate,
    error::Result,
    range_index::{DateRange, RangeIndex},
};

/// Payload of a selection change: year, month (0-11) and day of month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedDay {
    /// Year of the selected day.
    pub year: i32,
    /// Month of the selected day, 0-11.
    pub month: u32,
    /// Day of the month, 1-31.
    pub day_of_month: u32,
}

impl From<&CalendarDate> for SelectedDay {
    fn from(date: &CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day_of_month: date.day_of_month(),
        }
    }
}

/// Callback invoked when the selected day changes.
pub type DateChangeListener = Arc<dyn Fn(SelectedDay) + Send + Sync>;

/// Callback invoked with the new row generation whenever every row must be
/// rebuilt.
pub type InvalidationListener = Arc<dyn Fn(u64) + Send + Sync>;

/// Holds the selection and focused month against one [`RangeIndex`].
///
/// Each listener slot holds a single subscriber; registering replaces the
/// previous one.
pub struct SelectionStore {
    index: RangeIndex,
    selected: CalendarDate,
    selected_row: usize,
    focused_month: u32,
    generation: u64,
    on_date_change: Option<DateChangeListener>,
    on_invalidated: Option<InvalidationListener>,
}

impl SelectionStore {
    /// Creates a store with `selected` as the initial selection.
    pub fn new(index: RangeIndex, selected: CalendarDate) -> Result<Self> {
        index.range().check(&selected)?;
        Ok(Self {
            selected_row: index.row_index_of(&selected),
            focused_month: selected.month0(),
            index,
            selected,
            generation: 0,
            on_date_change: None,
            on_invalidated: None,
        })
    }

    /// Registers the selection listener, replacing any previous one.
    pub fn set_on_date_change(&mut self, listener: Option<DateChangeListener>) {
        self.on_date_change = listener;
    }

    /// Registers the row invalidation listener, replacing any previous one.
    pub fn set_on_invalidated(&mut self, listener: Option<InvalidationListener>) {
        self.on_invalidated = listener;
    }

    /// The index the selection is validated against.
    pub fn index(&self) -> &RangeIndex {
        &self.index
    }

    /// The selected date.
    pub fn selected(&self) -> CalendarDate {
        self.selected
    }

    /// Row holding the selected date.
    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    /// Focused month, 0-11.
    pub fn focused_month(&self) -> u32 {
        self.focused_month
    }

    /// Number of rows of the current index.
    pub fn total_rows(&self) -> usize {
        self.index.total_rows()
    }

    /// Counter bumped on every invalidation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Selects `date`. Returns `Ok(false)` when it is already selected.
    ///
    /// The caller clamps to the range first; an out-of-range date fails with
    /// [`CalendarError::DateOutOfRange`](crate::CalendarError::DateOutOfRange).
    pub fn set_selected_day(&mut self, date: CalendarDate, notify: bool) -> Result<bool> {
        if date.same_day(&self.selected) {
            return Ok(false);
        }
        self.index.range().check(&date)?;
        self.selected = date;
        self.selected_row = self.index.row_index_of(&date);
        self.focused_month = date.month0();
        self.invalidate();

        if notify && let Some(listener) = self.on_date_change.clone() {
            listener(SelectedDay::from(&date));
        }
        Ok(true)
    }

    /// Focuses `month` (0-11). Returns false when it was already focused.
    pub fn set_focus_month(&mut self, month: u32) -> bool {
        if self.focused_month == month {
            return false;
        }
        self.focused_month = month;
        self.invalidate();
        true
    }

    /// Replaces the range, failing with
    /// [`CalendarError::InvalidRange`](crate::CalendarError::InvalidRange)
    /// when `max` precedes `min`. The selection is kept as is, even when it
    /// now falls outside; re-homing it is up to the caller.
    pub fn set_range(&mut self, min: CalendarDate, max: CalendarDate) -> Result<()> {
        let range = DateRange::new(min, max)?;
        self.reindex(RangeIndex::new(range, self.index.first_day_of_week()));
        Ok(())
    }

    /// Changes the first day of the week.
    pub fn set_first_day_of_week(&mut self, first_day_of_week: Weekday) {
        self.reindex(RangeIndex::new(*self.index.range(), first_day_of_week));
    }

    fn reindex(&mut self, index: RangeIndex) {
        self.index = index;
        self.selected_row = self.index.row_index_of(&self.selected);
        debug!(
            total_rows = self.index.total_rows(),
            selected_row = self.selected_row,
            "calendar rows re-derived"
        );
        self.invalidate();
    }

    /// Signals that every row must be rebuilt.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(listener) = self.on_invalidated.clone() {
            listener(self.generation);
        }
    }

    /// Replaces the selection without range checks or notifications.
    ///
    /// Used when a reconfiguration re-expresses the same selection, e.g. in
    /// another time zone.
    pub(crate) fn replace_selected(&mut self, date: CalendarDate) {
        self.selected = date;
        self.selected_row = self.index.row_index_of(&date);
        self.invalidate();
    }
}
