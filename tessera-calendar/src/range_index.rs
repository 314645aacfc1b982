//! Mapping between dates and week rows.
//!
//! Rows are anchored at the week containing the range's minimum date. Row 0
//! starts on the last `first_day_of_week` on or before `min`, and every row
//! after it starts exactly one week later. Both directions of the mapping are
//! derived from that single anchor so that [`RangeIndex::total_rows`] and
//! [`RangeIndex::row_index_of`] can never disagree.
use chrono::{NaiveDate, TimeDelta, Weekday};

use crate::{
    clock::{CalendarDate, DAYS_PER_WEEK, days_after_week_start, weekday_from_number},
    error::{CalendarError, Result},
    metrics::Px,
};

/// An inclusive range of supported dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    min: CalendarDate,
    max: CalendarDate,
}

impl DateRange {
    /// Creates a range, rejecting `max` days before `min`.
    pub fn new(min: CalendarDate, max: CalendarDate) -> Result<Self> {
        if max.is_before_day(&min) {
            return Err(CalendarError::InvalidRange {
                min: min.day(),
                max: max.day(),
            });
        }
        Ok(Self { min, max })
    }

    /// First supported date.
    pub fn min(&self) -> CalendarDate {
        self.min
    }

    /// Last supported date.
    pub fn max(&self) -> CalendarDate {
        self.max
    }

    /// True when `date`'s day lies within the range.
    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.contains_day(date.day())
    }

    /// True when the local calendar `day` lies within the range.
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        (self.min.day()..=self.max.day()).contains(&day)
    }

    /// Returns `date`, or the nearest bound when it falls outside.
    pub fn clamp(&self, date: CalendarDate) -> CalendarDate {
        if date.is_before_day(&self.min) {
            self.min
        } else if date.is_after_day(&self.max) {
            self.max
        } else {
            date
        }
    }

    /// Fails with [`CalendarError::DateOutOfRange`] unless `date` is inside.
    pub fn check(&self, date: &CalendarDate) -> Result<()> {
        if self.contains(date) {
            Ok(())
        } else {
            Err(CalendarError::DateOutOfRange {
                date: date.day(),
                min: self.min.day(),
                max: self.max.day(),
            })
        }
    }
}

/// Date to row conversions for one range and week convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeIndex {
    range: DateRange,
    first_day_of_week: Weekday,
}

impl RangeIndex {
    /// Creates an index.
    pub fn new(range: DateRange, first_day_of_week: Weekday) -> Self {
        Self {
            range,
            first_day_of_week,
        }
    }

    /// Creates an index from a numeric first day (Sunday = 1 ... Saturday = 7).
    pub fn with_first_day_number(range: DateRange, first_day_of_week: i32) -> Result<Self> {
        Ok(Self::new(range, weekday_from_number(first_day_of_week)?))
    }

    /// The indexed range.
    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// The day each row starts on.
    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    /// Days between the start of row 0 and `range.min`.
    fn anchor_offset(&self) -> i64 {
        days_after_week_start(self.range.min.weekday(), self.first_day_of_week)
    }

    /// Row holding `date`. Dates before the range map to row 0.
    ///
    /// Elapsed time is measured between local calendar days, which is the
    /// same as subtracting the UTC-offset-corrected instants, so the result
    /// does not move across DST transitions.
    pub fn row_index_of(&self, date: &CalendarDate) -> usize {
        if date.is_before_day(&self.range.min) {
            return 0;
        }
        let elapsed_days = (date.day() - self.range.min.day()).num_days();
        ((elapsed_days + self.anchor_offset()) / DAYS_PER_WEEK) as usize
    }

    /// Number of rows needed to show every day of the range.
    ///
    /// This is the row of `max` plus one, so every distinct row produced by
    /// [`row_index_of`](Self::row_index_of) over the range is counted exactly
    /// once. No extra row is added for endpoints that do not fall on the
    /// first day of the week: the anchor offset already gives a partial first
    /// week its own row 0, so `max` always lands in the last counted row and
    /// an extra row would be empty.
    pub fn total_rows(&self) -> usize {
        self.row_index_of(&self.range.max) + 1
    }

    /// First day shown in `row`, at local midnight.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not below [`total_rows`](Self::total_rows).
    pub fn first_day_of_row(&self, row: usize) -> CalendarDate {
        assert!(
            row < self.total_rows(),
            "row index {row} out of bounds (total rows {})",
            self.total_rows()
        );
        let first_day = self.range.min.day()
            + TimeDelta::days(row as i64 * DAYS_PER_WEEK - self.anchor_offset());
        CalendarDate::at_start_of_day(first_day, self.range.min.time_zone())
    }
}

/// Resolves a horizontal tap position within a row to the tapped day.
///
/// Returns `None` for taps on the week-number cell or outside
/// `0..=row_width`.
pub fn pixel_to_date(
    x: f32,
    row_first_day: &CalendarDate,
    row_width: Px,
    num_cells: usize,
    shows_week_number: bool,
) -> Option<CalendarDate> {
    let width = row_width.to_f32();
    let day_start = if shows_week_number && num_cells > 0 {
        (row_width / num_cells as i32).to_f32()
    } else {
        0.0
    };
    if !(day_start..=width).contains(&x) || width <= day_start {
        return None;
    }
    let position = ((x - day_start) * DAYS_PER_WEEK as f32 / (width - day_start)) as i64;
    Some(row_first_day.add_days(position.min(DAYS_PER_WEEK - 1)))
}
