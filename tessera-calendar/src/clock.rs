//! Time-zone aware calendar dates and locale conventions.
//!
//! [`CalendarDate`] is an instant bound to a [`Tz`]. Comparisons used by the
//! engine happen at day granularity in that zone, while the time of day is
//! kept so that a selection survives round trips through epoch milliseconds.
use std::{cmp::Ordering, fmt};

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

pub use chrono::Weekday;

use crate::error::{CalendarError, Result};

/// Number of day cells in a row.
pub const DAYS_PER_WEEK: i64 = 7;

/// Half-hour steps tried when resolving a skipped local time (48 hours).
const MAX_GAP_STEPS: usize = 96;

/// Pattern of configured date strings (`MM/dd/yyyy`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// A date bound to a time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    instant: DateTime<Tz>,
}

impl CalendarDate {
    /// Creates a date from epoch milliseconds in the given zone.
    pub fn from_epoch_millis(millis: i64, tz: Tz) -> Result<Self> {
        let utc = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or(CalendarError::InvalidTimestamp(millis))?;
        Ok(Self {
            instant: utc.with_timezone(&tz),
        })
    }

    /// Local midnight of `day` in `tz`.
    pub fn at_start_of_day(day: NaiveDate, tz: Tz) -> Self {
        Self::from_local(day.and_time(chrono::NaiveTime::MIN), tz)
    }

    /// Creates a date from year, month (1-12) and day, at local midnight.
    pub fn from_ymd(year: i32, month: u32, day: u32, tz: Tz) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|day| Self::at_start_of_day(day, tz))
    }

    /// The current instant in `tz`.
    pub fn now(tz: Tz) -> Self {
        Self {
            instant: Utc::now().with_timezone(&tz),
        }
    }

    /// Resolves a wall-clock time. Ambiguous times take the earlier instant;
    /// times skipped by a transition move forward in 30 minute steps until
    /// they exist, which also covers zones that skipped a whole day.
    fn from_local(local: NaiveDateTime, tz: Tz) -> Self {
        let mut candidate = local;
        for _ in 0..MAX_GAP_STEPS {
            if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
                return Self { instant };
            }
            candidate += TimeDelta::minutes(30);
        }
        let offset = tz.offset_from_utc_datetime(&local).fix();
        let utc = local - TimeDelta::seconds(offset.local_minus_utc().into());
        Self {
            instant: tz.from_utc_datetime(&utc),
        }
    }

    /// Returns the zone this date is bound to.
    pub fn time_zone(&self) -> Tz {
        self.instant.timezone()
    }

    /// Returns epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }

    /// Returns the local calendar day.
    pub fn day(&self) -> NaiveDate {
        self.instant.date_naive()
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.instant.year()
    }

    /// Returns the month, 0-11.
    pub fn month0(&self) -> u32 {
        self.instant.month0()
    }

    /// Returns the day of the month, 1-31.
    pub fn day_of_month(&self) -> u32 {
        self.instant.day()
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        self.instant.weekday()
    }

    /// Returns the hour of the day, 0-23.
    pub fn hour(&self) -> u32 {
        self.instant.hour()
    }

    /// Returns the minute of the hour.
    pub fn minute(&self) -> u32 {
        self.instant.minute()
    }

    /// Adds calendar days, keeping the wall-clock time.
    pub fn add_days(&self, days: i64) -> Self {
        Self::from_local(
            self.instant.naive_local() + TimeDelta::days(days),
            self.time_zone(),
        )
    }

    /// Adds whole weeks, keeping the wall-clock time.
    pub fn add_weeks(&self, weeks: i64) -> Self {
        self.add_days(weeks * DAYS_PER_WEEK)
    }

    /// Returns this date truncated to local midnight.
    pub fn start_of_day(&self) -> Self {
        Self::at_start_of_day(self.day(), self.time_zone())
    }

    /// Returns the same wall-clock time on another day of this month,
    /// clamped to the month's length.
    pub fn with_day_of_month(&self, day: u32) -> Self {
        let local = self.instant.naive_local();
        let last = days_in_month(local.year(), local.month());
        let date = local
            .date()
            .with_day(day.clamp(1, last))
            .unwrap_or(local.date());
        Self::from_local(date.and_time(local.time()), self.time_zone())
    }

    /// Returns this day with the hour and minute of `other`.
    pub fn with_time_of_day_from(&self, other: &CalendarDate) -> Self {
        let time = chrono::NaiveTime::from_hms_opt(other.hour(), other.minute(), 0)
            .unwrap_or(chrono::NaiveTime::MIN);
        Self::from_local(self.day().and_time(time), self.time_zone())
    }

    /// Re-expresses the same instant in another zone.
    pub fn in_time_zone(&self, tz: Tz) -> Self {
        Self {
            instant: self.instant.with_timezone(&tz),
        }
    }

    /// Re-binds the same local calendar day and time to another zone.
    pub fn with_local_fields_in(&self, tz: Tz) -> Self {
        Self::from_local(self.instant.naive_local(), tz)
    }

    /// True when both dates fall on the same local day.
    pub fn same_day(&self, other: &CalendarDate) -> bool {
        self.day() == other.day()
    }

    /// Orders two dates by local day, ignoring the time of day.
    pub fn day_cmp(&self, other: &CalendarDate) -> Ordering {
        self.day().cmp(&other.day())
    }

    /// True when this date's day precedes `other`'s day.
    pub fn is_before_day(&self, other: &CalendarDate) -> bool {
        self.day_cmp(other) == Ordering::Less
    }

    /// True when this date's day follows `other`'s day.
    pub fn is_after_day(&self, other: &CalendarDate) -> bool {
        self.day_cmp(other) == Ordering::Greater
    }

    /// Week of the year under `rule`.
    pub fn week_of_year(&self, rule: WeekRule) -> u32 {
        week_of_year(self.day(), rule)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.day().format("%Y-%m-%d"))
    }
}

/// Parses an `MM/dd/yyyy` string as local midnight in `tz`.
pub fn parse_date(text: &str, tz: Tz) -> Option<CalendarDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .ok()
        .map(|day| CalendarDate::at_start_of_day(day, tz))
}

/// Parses a tz database name such as `Europe/Berlin`.
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CalendarError::UnknownTimeZone(name.to_string()))
}

/// Converts a 1-based weekday number (Sunday = 1 ... Saturday = 7).
pub fn weekday_from_number(number: i32) -> Result<Weekday> {
    match number {
        1 => Ok(Weekday::Sun),
        2 => Ok(Weekday::Mon),
        3 => Ok(Weekday::Tue),
        4 => Ok(Weekday::Wed),
        5 => Ok(Weekday::Thu),
        6 => Ok(Weekday::Fri),
        7 => Ok(Weekday::Sat),
        other => Err(CalendarError::InvalidFirstDayOfWeek(other)),
    }
}

/// Days from `first_day_of_week` forward to `day` (0-6).
pub fn days_after_week_start(day: Weekday, first_day_of_week: Weekday) -> i64 {
    (i64::from(day.num_days_from_sunday()) - i64::from(first_day_of_week.num_days_from_sunday()))
        .rem_euclid(DAYS_PER_WEEK)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Week numbering convention of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRule {
    /// Day that starts a week.
    pub first_day_of_week: Weekday,
    /// Days of the new year the first week must contain (1-7).
    pub minimal_days_in_first_week: u32,
}

impl WeekRule {
    /// US convention: Sunday first, week 1 contains January 1st.
    pub const US: WeekRule = WeekRule {
        first_day_of_week: Weekday::Sun,
        minimal_days_in_first_week: 1,
    };

    /// ISO-8601: Monday first, week 1 contains the first Thursday.
    pub const ISO: WeekRule = WeekRule {
        first_day_of_week: Weekday::Mon,
        minimal_days_in_first_week: 4,
    };

    /// Same rule with a different first day.
    pub fn with_first_day(self, first_day_of_week: Weekday) -> Self {
        Self {
            first_day_of_week,
            ..self
        }
    }
}

fn week_start(day: NaiveDate, first_day_of_week: Weekday) -> NaiveDate {
    day - TimeDelta::days(days_after_week_start(day.weekday(), first_day_of_week))
}

fn first_week_start(year: i32, rule: WeekRule) -> NaiveDate {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let start = week_start(jan1, rule.first_day_of_week);
    let days_in_year = DAYS_PER_WEEK - (jan1 - start).num_days();
    if days_in_year >= i64::from(rule.minimal_days_in_first_week.clamp(1, 7)) {
        start
    } else {
        start + TimeDelta::days(DAYS_PER_WEEK)
    }
}

fn week_of_year(day: NaiveDate, rule: WeekRule) -> u32 {
    let start = week_start(day, rule.first_day_of_week);
    let next_year = first_week_start(start.year() + 1, rule);
    if start >= next_year {
        return 1;
    }
    let mut first = first_week_start(start.year(), rule);
    if start < first {
        first = first_week_start(start.year() - 1, rule);
    }
    ((start - first).num_days() / DAYS_PER_WEEK) as u32 + 1
}

/// Month and weekday names plus the week convention of a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    month_names: [String; 12],
    /// Indexed from Sunday.
    weekday_names: [String; 7],
    /// Indexed from Sunday.
    short_weekday_names: [String; 7],
    week_rule: WeekRule,
}

impl Locale {
    /// Creates a locale from injected name tables. Weekday tables start at
    /// Sunday.
    pub fn new(
        month_names: [String; 12],
        weekday_names: [String; 7],
        short_weekday_names: [String; 7],
        week_rule: WeekRule,
    ) -> Self {
        Self {
            month_names,
            weekday_names,
            short_weekday_names,
            week_rule,
        }
    }

    /// English names with the US week convention.
    pub fn en_us() -> Self {
        Self::new(
            [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]
            .map(String::from),
            [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]
            .map(String::from),
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"].map(String::from),
            WeekRule::US,
        )
    }

    /// English names with the ISO week convention.
    pub fn en_gb() -> Self {
        Self {
            week_rule: WeekRule::ISO,
            ..Self::en_us()
        }
    }

    /// The week convention.
    pub fn week_rule(&self) -> WeekRule {
        self.week_rule
    }

    /// The locale's first day of the week.
    pub fn first_day_of_week(&self) -> Weekday {
        self.week_rule.first_day_of_week
    }

    /// Full month name for a 0-based month.
    pub fn month_name(&self, month0: u32) -> &str {
        &self.month_names[(month0 % 12) as usize]
    }

    /// Full weekday name.
    pub fn weekday_name(&self, day: Weekday) -> &str {
        &self.weekday_names[day.num_days_from_sunday() as usize]
    }

    /// Abbreviated weekday name.
    pub fn short_weekday_name(&self, day: Weekday) -> &str {
        &self.short_weekday_names[day.num_days_from_sunday() as usize]
    }

    /// Header label, e.g. `January 1970`.
    pub fn format_month(&self, date: &CalendarDate) -> String {
        format!("{} {}", self.month_name(date.month0()), date.year())
    }

    /// Day description, e.g. `Thursday 1 January`.
    pub fn format_day(&self, date: &CalendarDate) -> String {
        self.format_calendar_day(date.day())
    }

    /// Day description of a local calendar day.
    pub fn format_calendar_day(&self, day: NaiveDate) -> String {
        format!(
            "{} {} {}",
            self.weekday_name(day.weekday()),
            day.day(),
            self.month_name(day.month0())
        )
    }

    /// Full date description, e.g. `Thursday 1 January 1970`.
    pub fn format_date(&self, date: &CalendarDate) -> String {
        format!("{} {}", self.format_day(date), date.year())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}
