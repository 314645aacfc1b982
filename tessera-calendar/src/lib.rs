//! An infinite-scrolling week-grid calendar engine.
//!
//! Every row of the grid is one week between a configurable minimum and
//! maximum date. The engine maps dates to rows and back, builds per-row view
//! models, tracks which month is "displayed" while the list scrolls, snaps a
//! partially visible first row into alignment once scrolling stops, and
//! keeps the selected date and focused month consistent.
//!
//! Rendering and the scrolling list itself belong to the host. The host
//! feeds [`WeekCalendarController`] scroll samples, phase changes, taps and
//! clock ticks, and executes the [`HostCommand`]s it drains afterwards.
//!
//! ```
//! use std::time::Instant;
//!
//! use tessera_calendar::{HostCommand, WeekCalendarArgs, WeekCalendarController};
//!
//! let mut calendar = WeekCalendarController::new(
//!     WeekCalendarArgs::default()
//!         .min_date("01/01/2020")
//!         .max_date("12/31/2020")
//!         .set_initial_date(false),
//! )?;
//! assert_eq!(calendar.month_label(), "January 2020");
//!
//! // 2020-07-04 00:00 UTC
//! calendar.set_date(1_593_820_800_000, Instant::now())?;
//! assert_eq!(calendar.month_label(), "July 2020");
//! assert!(calendar
//!     .take_commands()
//!     .iter()
//!     .any(|command| matches!(command, HostCommand::ScrollToRow { .. })));
//! # Ok::<(), tessera_calendar::CalendarError>(())
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod args;
pub mod clock;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod range_index;
pub mod row_model;
pub mod scroll_tracker;
pub mod selection;
pub mod settle;

pub use chrono_tz::Tz;

pub use crate::{
    args::WeekCalendarArgs,
    clock::{CalendarDate, Locale, Weekday},
    controller::{
        DayNamesHeader, GOTO_SCROLL_DURATION, HeaderCell, HostCommand, SavedState,
        WeekCalendarController,
    },
    error::{CalendarError, Result},
    metrics::{Dp, Px},
    range_index::{DateRange, RangeIndex},
    row_model::{RowModelBuilder, RowViewModel, SelectionBounds},
    scroll_tracker::{ScrollPhase, ScrollSample},
    selection::{DateChangeListener, InvalidationListener, SelectedDay},
};
