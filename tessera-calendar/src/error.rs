//! Error type shared by the calendar engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by range configuration and contract-checked operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The configured maximum date precedes the minimum date.
    #[error("max date {max} cannot be before min date {min}")]
    InvalidRange {
        /// Configured minimum day.
        min: NaiveDate,
        /// Configured maximum day.
        max: NaiveDate,
    },
    /// A numeric first-day-of-week outside `1..=7` (Sunday = 1).
    #[error("invalid first day of week: {0} (expected 1..=7, Sunday = 1)")]
    InvalidFirstDayOfWeek(i32),
    /// A date outside the supported range was passed to an operation that
    /// requires the caller to clamp first.
    #[error("date {date} not between {min} and {max}")]
    DateOutOfRange {
        /// Offending day.
        date: NaiveDate,
        /// Range start.
        min: NaiveDate,
        /// Range end.
        max: NaiveDate,
    },
    /// Epoch milliseconds that cannot be represented as a date.
    #[error("timestamp {0} ms is out of the representable range")]
    InvalidTimestamp(i64),
    /// A time-zone name that is not in the tz database.
    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),
}

/// Result alias for calendar operations.
pub type Result<T, E = CalendarError> = std::result::Result<T, E>;
