//! View models for single week rows.
//!
//! A [`RowViewModel`] is a pure function of the row index, the selection,
//! the focused month and the index configuration. Renderers may cache or
//! recycle them, but two builds with the same inputs are always equal.
use chrono::{Datelike, TimeDelta};
use smallvec::SmallVec;

use crate::{
    clock::{CalendarDate, DAYS_PER_WEEK, Locale, days_after_week_start},
    metrics::Px,
    range_index::RangeIndex,
};

/// Upper bound on cells per row: seven days plus the week number.
pub const MAX_CELLS: usize = 8;

/// Horizontal pixel bounds of the selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBounds {
    /// Left edge of the selected cell.
    pub left: Px,
    /// Right edge of the selected cell.
    pub right: Px,
}

/// Month attribution of a row, as used by scroll tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMonths {
    /// First day shown in the row.
    pub first_day: CalendarDate,
    /// Month (0-11) of the row's first day.
    pub month_of_first_day: u32,
    /// Month (0-11) the row's last day is attributed to.
    pub month_of_last_day: u32,
}

/// Everything a renderer needs to paint one week row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViewModel {
    /// Index of the row in the list.
    pub row_index: usize,
    /// First day shown in the row.
    pub first_day_of_row: CalendarDate,
    /// Cell labels: day numbers, blank outside the range. With week numbers
    /// shown, cell 0 holds the week number.
    pub cell_labels: SmallVec<[String; MAX_CELLS]>,
    /// Whether each cell's day belongs to the focused month.
    pub cell_in_focused_month: SmallVec<[bool; MAX_CELLS]>,
    /// Cell holding the selected day, if the selection is in this row.
    pub selected_cell_index: Option<usize>,
    /// Pixel bounds of the selected cell, when the row width is known.
    pub selection_bounds: Option<SelectionBounds>,
    /// Month (0-11) of the row's first day.
    pub month_of_first_day: u32,
    /// Month (0-11) the row's last day is attributed to.
    pub month_of_last_day: u32,
    /// Week of the year, when week numbers are shown.
    pub week_number: Option<u32>,
    /// Accessibility description of the row.
    pub content_description: String,
}

impl RowViewModel {
    /// Number of cells, including the week-number cell.
    pub fn num_cells(&self) -> usize {
        self.cell_labels.len()
    }

    /// Whether the row shows a week-number cell.
    pub fn shows_week_number(&self) -> bool {
        self.week_number.is_some()
    }
}

/// Builds row view models for one index configuration.
#[derive(Debug, Clone, Copy)]
pub struct RowModelBuilder<'a> {
    index: &'a RangeIndex,
    locale: &'a Locale,
    show_week_number: bool,
}

impl<'a> RowModelBuilder<'a> {
    /// Creates a builder.
    pub fn new(index: &'a RangeIndex, locale: &'a Locale, show_week_number: bool) -> Self {
        Self {
            index,
            locale,
            show_week_number,
        }
    }

    /// Cells per row.
    pub fn num_cells(&self) -> usize {
        if self.show_week_number {
            DAYS_PER_WEEK as usize + 1
        } else {
            DAYS_PER_WEEK as usize
        }
    }

    /// Month attribution of `row` without building the labels.
    ///
    /// The last day's month steps back one day when the row ends on the 1st
    /// of a month, so such a row still counts toward the previous month.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_months(&self, row: usize) -> RowMonths {
        let first_day = self.index.first_day_of_row(row);
        let mut last_day = first_day.day() + TimeDelta::days(DAYS_PER_WEEK - 1);
        if last_day.day() == 1 {
            last_day -= TimeDelta::days(1);
        }
        RowMonths {
            first_day,
            month_of_first_day: first_day.month0(),
            month_of_last_day: last_day.month0(),
        }
    }

    /// Builds the view model of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn build(
        &self,
        row: usize,
        selected: Option<&CalendarDate>,
        focused_month: u32,
        row_width: Option<Px>,
    ) -> RowViewModel {
        let months = self.row_months(row);
        let range = self.index.range();
        let num_cells = self.num_cells();

        let mut cell_labels = SmallVec::with_capacity(num_cells);
        let mut cell_in_focused_month = SmallVec::with_capacity(num_cells);
        let mut described_days = Vec::with_capacity(DAYS_PER_WEEK as usize);

        let week_number = self.show_week_number.then(|| {
            months.first_day.week_of_year(
                self.locale
                    .week_rule()
                    .with_first_day(self.index.first_day_of_week()),
            )
        });
        if let Some(week) = week_number {
            cell_labels.push(week.to_string());
            cell_in_focused_month.push(false);
        }

        // Cells walk local calendar days, so a day a zone skipped entirely
        // still gets its own cell.
        let first_day = months.first_day.day();
        for offset in 0..DAYS_PER_WEEK {
            let day = first_day + TimeDelta::days(offset);
            cell_in_focused_month.push(day.month0() == focused_month);
            if range.contains_day(day) {
                cell_labels.push(day.day().to_string());
                described_days.push(self.locale.format_calendar_day(day));
            } else {
                cell_labels.push(String::new());
            }
        }

        let mut content_description = described_days.join(", ");
        if let Some(week) = week_number {
            content_description = format!("{week}: {content_description}");
        }

        let selected_cell_index = selected
            .filter(|date| self.index.range().contains(date))
            .filter(|date| self.index.row_index_of(date) == row)
            .map(|date| {
                let position =
                    days_after_week_start(date.weekday(), self.index.first_day_of_week()) as usize;
                if self.show_week_number {
                    position + 1
                } else {
                    position
                }
            });
        let selection_bounds = selected_cell_index
            .zip(row_width)
            .map(|(cell, width)| selection_bounds(cell, num_cells, width));

        RowViewModel {
            row_index: row,
            first_day_of_row: months.first_day,
            cell_labels,
            cell_in_focused_month,
            selected_cell_index,
            selection_bounds,
            month_of_first_day: months.month_of_first_day,
            month_of_last_day: months.month_of_last_day,
            week_number,
            content_description,
        }
    }
}

fn selection_bounds(cell: usize, num_cells: usize, width: Px) -> SelectionBounds {
    let cells = num_cells as i32;
    SelectionBounds {
        left: width * cell as i32 / cells,
        right: width * (cell as i32 + 1) / cells,
    }
}
