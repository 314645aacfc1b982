use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tessera_calendar::{
    HostCommand, Px, SavedState, ScrollPhase, ScrollSample, SelectedDay, Tz,
    WeekCalendarArgs, WeekCalendarController, Weekday, clock::parse_date,
    settle::ADJUSTMENT_SCROLL_DURATION,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn millis(text: &str) -> i64 {
    parse_date(text, Tz::UTC).unwrap().epoch_millis()
}

fn sunday_calendar() -> WeekCalendarController {
    init_tracing();
    WeekCalendarController::new(
        WeekCalendarArgs::default()
            .first_day_of_week(Weekday::Sun)
            .set_initial_date(false),
    )
    .unwrap()
}

fn sample(first_visible_row: usize, row_bottom: i32) -> ScrollSample {
    ScrollSample {
        first_visible_row,
        row_height: Px(100),
        row_bottom: Px(row_bottom),
    }
}

#[test]
fn scrolling_into_february_updates_month_and_settles() {
    let mut calendar = sunday_calendar();
    let start = Instant::now();

    calendar.on_scroll_state_changed(ScrollPhase::Dragging, start);
    calendar.tick(start + Duration::from_millis(50));

    calendar.on_scroll(sample(2, 50));
    assert_eq!(calendar.month_label(), "January 1970");
    // Row 5 is 1970-02-01..07.
    calendar.on_scroll(sample(5, 90));
    assert_eq!(calendar.month_label(), "February 1970");
    assert_eq!(calendar.current_month_displayed(), 1);
    assert_eq!(calendar.focused_month(), 1);
    assert_eq!(
        calendar.take_commands(),
        [
            HostCommand::MonthLabelChanged("February 1970".to_string()),
            HostCommand::Announce("February 1970".to_string()),
        ]
    );

    let released = start + Duration::from_millis(300);
    calendar.on_scroll_state_changed(ScrollPhase::Idle, released);
    calendar.tick(released + Duration::from_millis(10));
    assert!(calendar.take_commands().is_empty());
    assert_eq!(
        calendar.next_deadline(),
        Some(released + tessera_calendar::settle::SCROLL_CHANGE_DELAY)
    );

    calendar.tick(released + Duration::from_millis(60));
    assert_eq!(
        calendar.take_commands(),
        [HostCommand::SmoothScrollBy {
            delta: Px(88),
            duration: ADJUSTMENT_SCROLL_DURATION,
        }]
    );
    assert_eq!(calendar.next_deadline(), None);
}

#[test]
fn scrolling_back_up_returns_to_january() {
    let mut calendar = sunday_calendar();
    calendar.on_scroll(sample(5, 90));
    calendar.on_scroll(sample(8, 90));
    assert_eq!(calendar.current_month_displayed(), 1);
    calendar.take_commands();

    // Scrolling up samples two rows past the top: row 3 + 2 = 5 starts in
    // February, row 2 + 2 = 4 starts in January.
    calendar.on_scroll(sample(3, 50));
    assert_eq!(calendar.current_month_displayed(), 1);
    calendar.on_scroll(sample(2, 50));
    assert_eq!(calendar.current_month_displayed(), 0);
    assert_eq!(calendar.month_label(), "January 1970");
}

#[test]
fn tap_selects_day_and_notifies_once() {
    let mut calendar = sunday_calendar();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    calendar.set_on_date_change(Some(Arc::new(move |day: SelectedDay| {
        sink.lock().unwrap().push(day);
    })));

    // Eight 100px cells; the first holds the week number.
    assert!(!calendar.on_tap(5, 50.0, Px(800)));
    assert!(calendar.on_tap(5, 350.0, Px(800)));
    assert!(!calendar.on_tap(5, 350.0, Px(800)));

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        [SelectedDay {
            year: 1970,
            month: 1,
            day_of_month: 3,
        }]
    );
    assert_eq!(calendar.date(), millis("02/03/1970"));

    let commands = calendar.take_commands();
    assert!(commands.contains(&HostCommand::Announce("Tuesday 3 February 1970".to_string())));
    assert!(commands.contains(&HostCommand::MonthLabelChanged("February 1970".to_string())));

    let row = calendar.row(5, Some(Px(800)));
    assert_eq!(row.selected_cell_index, Some(3));
    let bounds = row.selection_bounds.unwrap();
    assert_eq!((bounds.left, bounds.right), (Px(300), Px(400)));
    assert!(row.cell_in_focused_month[1..].iter().all(|focused| *focused));
}

#[test]
fn tap_keeps_time_of_day_of_previous_selection() {
    init_tracing();
    let mut calendar = WeekCalendarController::new(
        WeekCalendarArgs::default()
            .first_day_of_week(Weekday::Sun)
            .show_week_number(false)
            .initial_date_millis(millis("01/03/1970") + 9 * 3_600_000 + 30 * 60_000),
    )
    .unwrap();
    assert!(calendar.on_tap(0, 550.0, Px(700)));
    assert_eq!(
        calendar.date(),
        millis("01/02/1970") + 9 * 3_600_000 + 30 * 60_000
    );
}

#[test]
fn taps_outside_range_are_ignored() {
    init_tracing();
    let mut calendar = WeekCalendarController::new(
        WeekCalendarArgs::default()
            .min_date("01/07/1970")
            .first_day_of_week(Weekday::Sun)
            .show_week_number(false),
    )
    .unwrap();
    let before = calendar.date();
    // Row 0 is 1970-01-04..10; Monday the 5th precedes the min date.
    assert!(!calendar.on_tap(0, 150.0, Px(700)));
    assert_eq!(calendar.date(), before);
    assert_eq!(calendar.row(0, None).cell_labels[1], "");
}

#[test]
fn restore_without_list_state_scrolls_to_selection() {
    let mut first = sunday_calendar();
    first
        .set_date(millis("05/20/1970"), Instant::now())
        .unwrap();
    let saved: SavedState<String> = first.save_state(None);
    assert_eq!(saved.selected_date_millis, millis("05/20/1970"));

    let mut restored = sunday_calendar();
    restored.take_commands();
    let list_state = restored.restore_state(saved, Instant::now()).unwrap();
    assert_eq!(list_state, None);
    assert_eq!(restored.date(), millis("05/20/1970"));
    assert_eq!(restored.focused_month(), 4);
    assert_eq!(restored.focused_date(), millis("05/01/1970"));
    assert_eq!(
        restored.take_commands(),
        [
            HostCommand::MonthLabelChanged("May 1970".to_string()),
            HostCommand::ScrollToRow {
                row: 17,
                top_offset: Px(2),
            },
        ]
    );
    assert!(restored.next_deadline().is_some());
}

#[test]
fn restore_with_list_state_does_not_scroll() {
    let mut restored = sunday_calendar();
    restored.take_commands();
    let saved = SavedState {
        list_state: Some("offset=1234".to_string()),
        selected_date_millis: millis("05/20/1970"),
        focused_date_millis: millis("06/01/1970"),
    };
    let list_state = restored.restore_state(saved, Instant::now()).unwrap();
    assert_eq!(list_state.as_deref(), Some("offset=1234"));
    assert_eq!(restored.date(), millis("05/20/1970"));
    assert_eq!(restored.focused_month(), 5);
    assert_eq!(restored.month_label(), "June 1970");
    assert!(
        restored
            .take_commands()
            .iter()
            .all(|command| matches!(command, HostCommand::MonthLabelChanged(_)))
    );
}

#[test]
fn rows_are_invalidated_on_reconfiguration() {
    let mut calendar = sunday_calendar();
    let generations = Arc::new(Mutex::new(Vec::new()));
    let sink = generations.clone();
    calendar.set_on_rows_invalidated(Some(Arc::new(move |generation: u64| {
        sink.lock().unwrap().push(generation);
    })));

    let rows = calendar.total_rows();
    calendar.set_show_week_number(false);
    assert_eq!(calendar.row(0, None).num_cells(), 7);
    calendar.set_first_day_of_week(Weekday::Mon);
    assert_eq!(calendar.day_names_header().cells[0].label, "M");
    assert!(calendar.total_rows() <= rows + 1);

    let generations = generations.lock().unwrap();
    assert!(generations.len() >= 2);
    assert!(generations.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(generations.last().copied(), Some(calendar.generation()));
}

#[test]
fn every_day_maps_to_a_row_starting_on_the_first_day_of_week() {
    init_tracing();
    let calendar = WeekCalendarController::new(
        WeekCalendarArgs::default()
            .min_date("03/15/2021")
            .max_date("11/15/2021")
            .first_day_of_week(Weekday::Mon)
            .time_zone(Tz::Europe__Berlin)
            .set_initial_date(false),
    )
    .unwrap();
    for row in 0..calendar.total_rows() {
        let first = calendar.row(row, None).first_day_of_row;
        assert_eq!(first.weekday(), Weekday::Mon);
        if row + 1 < calendar.total_rows() {
            let next = calendar.row(row + 1, None).first_day_of_row;
            assert!(first.add_weeks(1).same_day(&next));
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn saved_state_survives_json() {
    let calendar = sunday_calendar();
    let saved = calendar.save_state(Some(vec![3_u32, 40]));
    let json = serde_json::to_string(&saved).unwrap();
    let back: SavedState<Vec<u32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, saved);
}
