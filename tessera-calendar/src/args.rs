//! Configuration for [`WeekCalendarController`](crate::WeekCalendarController).
use chrono::Weekday;
use chrono_tz::Tz;
use derive_setters::Setters;

use crate::{clock::Locale, metrics::Dp};

/// Default first supported date.
pub const DEFAULT_MIN_DATE: &str = "01/01/1970";
/// Default last supported date.
pub const DEFAULT_MAX_DATE: &str = "01/01/2100";
/// Default number of rows visible at once.
pub const DEFAULT_SHOWN_WEEK_COUNT: usize = 6;
/// Week numbers are shown unless disabled.
pub const DEFAULT_SHOW_WEEK_NUMBER: bool = true;

/// Options recognized by the week calendar.
///
/// Date strings use the `MM/dd/yyyy` pattern. Strings that fail to parse
/// fall back to [`DEFAULT_MIN_DATE`] / [`DEFAULT_MAX_DATE`].
#[derive(Debug, Clone, Setters)]
pub struct WeekCalendarArgs {
    /// First supported date.
    #[setters(into)]
    pub min_date: String,
    /// Last supported date.
    #[setters(into)]
    pub max_date: String,
    /// Day each row starts on. `None` follows the locale.
    #[setters(strip_option)]
    pub first_day_of_week: Option<Weekday>,
    /// Number of rows the list shows at once.
    pub shown_week_count: usize,
    /// Whether rows carry a leading week-number cell.
    pub show_week_number: bool,
    /// Whether construction selects an initial date.
    pub set_initial_date: bool,
    /// Initial selection in epoch milliseconds. `None` uses the current time.
    #[setters(strip_option)]
    pub initial_date_millis: Option<i64>,
    /// Zone the calendar days are computed in.
    pub time_zone: Tz,
    /// Name tables and week convention.
    pub locale: Locale,
    /// A first row showing less than this is skipped when sampling the month.
    pub week_min_visible_height: Dp,
    /// Resting offset of the first row below the list top.
    pub list_scroll_top_offset: Dp,
    /// A first row whose top is lower than this hides the last row partially.
    pub bottom_buffer: Dp,
}

impl Default for WeekCalendarArgs {
    fn default() -> Self {
        Self {
            min_date: DEFAULT_MIN_DATE.to_string(),
            max_date: DEFAULT_MAX_DATE.to_string(),
            first_day_of_week: None,
            shown_week_count: DEFAULT_SHOWN_WEEK_COUNT,
            show_week_number: DEFAULT_SHOW_WEEK_NUMBER,
            set_initial_date: true,
            initial_date_millis: None,
            time_zone: Tz::UTC,
            locale: Locale::default(),
            week_min_visible_height: Dp(12.0),
            list_scroll_top_offset: Dp(2.0),
            bottom_buffer: Dp(20.0),
        }
    }
}
