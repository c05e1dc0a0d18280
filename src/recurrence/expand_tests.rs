//! Tests for recurrence expansion.

use super::*;
use crate::model::EventId;
use chrono::{Datelike, Duration, TimeZone, Weekday};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn master(start: DateTime<Utc>, minutes: i64, rule: Option<RecurrenceRule>) -> MasterEvent {
    MasterEvent {
        id: EventId::new("evt").unwrap(),
        interval: Interval::starting_at(start, Duration::minutes(minutes)).unwrap(),
        recurrence: rule,
    }
}

fn starts(expansion: &Expansion) -> Vec<DateTime<Utc>> {
    expansion
        .occurrences
        .iter()
        .map(|o| o.interval.start())
        .collect()
}

// ===== Non-recurring =====

#[test]
fn single_event_inside_window_yields_itself() {
    let event = master(utc(2024, 5, 6, 9, 0), 60, None);
    let result = expand(&event, utc(2024, 5, 6, 0, 0), utc(2024, 5, 7, 0, 0), 100);
    assert_eq!(result.len(), 1);
    assert_eq!(result.occurrences[0].interval, event.interval);
    assert!(!result.truncated);
}

#[test]
fn single_event_outside_window_yields_nothing() {
    let event = master(utc(2024, 5, 6, 9, 0), 60, None);
    let result = expand(&event, utc(2024, 5, 6, 10, 0), utc(2024, 5, 7, 0, 0), 100);
    assert!(result.is_empty());
}

#[test]
fn rule_without_frequency_behaves_like_single_event() {
    let event = master(utc(2024, 5, 6, 9, 0), 60, Some(RecurrenceRule::unspecified()));
    let result = expand(&event, utc(2024, 5, 1, 0, 0), utc(2024, 6, 1, 0, 0), 100);
    assert_eq!(starts(&result), vec![utc(2024, 5, 6, 9, 0)]);
}

// ===== Weekly =====

#[test]
fn weekly_weekdays_walk_within_week() {
    // Monday 2024-03-04, query through the start of the following Monday.
    let rule = RecurrenceRule::new(Frequency::Weekly).with_weekdays([
        Weekday::Mon,
        Weekday::Wed,
        Weekday::Fri,
    ]);
    let event = master(utc(2024, 3, 4, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 3, 4, 0, 0), utc(2024, 3, 11, 0, 0), 100);

    assert_eq!(
        starts(&result),
        vec![utc(2024, 3, 4, 9, 0), utc(2024, 3, 6, 9, 0), utc(2024, 3, 8, 9, 0)]
    );
    for occ in &result.occurrences {
        assert_eq!(occ.interval.duration(), Duration::hours(1));
    }
}

#[test]
fn weekly_weekdays_wrap_to_interval_th_week() {
    let rule = RecurrenceRule::new(Frequency::Weekly)
        .with_interval(2)
        .with_weekdays([Weekday::Mon, Weekday::Thu]);
    let event = master(utc(2024, 3, 4, 9, 0), 30, Some(rule));
    let result = expand(&event, utc(2024, 3, 1, 0, 0), utc(2024, 3, 31, 0, 0), 100);

    assert_eq!(
        starts(&result),
        vec![
            utc(2024, 3, 4, 9, 0),
            utc(2024, 3, 7, 9, 0),
            utc(2024, 3, 18, 9, 0),
            utc(2024, 3, 21, 9, 0),
        ]
    );
}

#[test]
fn weekly_origin_not_in_weekdays_is_skipped() {
    // Tuesday origin, Mondays only: the series starts the following Monday.
    let rule = RecurrenceRule::new(Frequency::Weekly).with_weekdays([Weekday::Mon]);
    let event = master(utc(2024, 3, 5, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 3, 1, 0, 0), utc(2024, 3, 19, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![utc(2024, 3, 11, 9, 0), utc(2024, 3, 18, 9, 0)]
    );
}

#[test]
fn weekly_without_weekdays_steps_whole_weeks() {
    let rule = RecurrenceRule::new(Frequency::Weekly).with_interval(3);
    let event = master(utc(2024, 1, 3, 12, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 2, 28, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![
            utc(2024, 1, 3, 12, 0),
            utc(2024, 1, 24, 12, 0),
            utc(2024, 2, 14, 12, 0)
        ]
    );
}

// ===== Monthly / yearly =====

#[test]
fn month_day_31_skips_short_months() {
    // 2023 is not a leap year; February has no 31st.
    let rule = RecurrenceRule::new(Frequency::Monthly).with_month_days([31]);
    let event = master(utc(2023, 1, 31, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2023, 2, 1, 0, 0), utc(2023, 3, 31, 23, 59), 100);
    assert_eq!(starts(&result), vec![utc(2023, 3, 31, 9, 0)]);
}

#[test]
fn monthly_from_month_end_does_not_drift() {
    let rule = RecurrenceRule::new(Frequency::Monthly);
    let event = master(utc(2024, 1, 31, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 6, 1, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![
            utc(2024, 1, 31, 9, 0),
            utc(2024, 3, 31, 9, 0),
            utc(2024, 5, 31, 9, 0)
        ]
    );
}

#[test]
fn yearly_leap_day_only_lands_in_leap_years() {
    let rule = RecurrenceRule::new(Frequency::Yearly);
    let event = master(utc(2024, 2, 29, 8, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2030, 1, 1, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![utc(2024, 2, 29, 8, 0), utc(2028, 2, 29, 8, 0)]
    );
}

#[test]
fn yearly_by_month_filters_candidates() {
    let rule = RecurrenceRule::new(Frequency::Yearly).with_months([3]);
    let event = master(utc(2024, 3, 15, 8, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2027, 1, 1, 0, 0), 100);
    assert_eq!(result.len(), 3);

    let other = RecurrenceRule::new(Frequency::Yearly).with_months([4]);
    let event = master(utc(2024, 3, 15, 8, 0), 60, Some(other));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2027, 1, 1, 0, 0), 100);
    assert!(result.is_empty());
}

// ===== Termination =====

#[test]
fn count_applies_to_whole_series_not_window() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_count(5);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 3, 0, 0), utc(2024, 1, 10, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![utc(2024, 1, 3, 9, 0), utc(2024, 1, 4, 9, 0), utc(2024, 1, 5, 9, 0)]
    );
    assert!(!result.truncated);
}

#[test]
fn until_is_inclusive_of_matching_origin() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_until(utc(2024, 1, 3, 9, 0));
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 2, 1, 0, 0), 100);
    assert_eq!(result.len(), 3);
    assert!(!result.truncated);
}

#[test]
fn cap_truncates_unbounded_series_and_says_so() {
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2030, 1, 1, 0, 0), 10);
    assert_eq!(result.len(), 10);
    assert!(result.truncated);
}

#[test]
fn count_reached_at_cap_is_not_truncation() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_count(10);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2030, 1, 1, 0, 0), 10);
    assert_eq!(result.len(), 10);
    assert!(!result.truncated);
}

#[test]
fn filtered_steps_consume_the_cap() {
    // Daily walk, only the 1st of the month matches: 40 steps reach Feb 1.
    let rule = RecurrenceRule::new(Frequency::Daily).with_month_days([1]);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2025, 1, 1, 0, 0), 40);
    assert_eq!(
        starts(&result),
        vec![utc(2024, 1, 1, 9, 0), utc(2024, 2, 1, 9, 0)]
    );
    assert!(result.truncated);
}

#[test]
fn window_end_stops_walk() {
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 1, 4, 0, 0), 100);
    assert_eq!(result.len(), 3);
    assert!(!result.truncated);
}

#[test]
fn steps_before_window_consume_the_cap() {
    // 152 daily steps lie between the master start and the window.
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand(&event, utc(2024, 6, 1, 0, 0), utc(2024, 6, 8, 0, 0), 100);
    assert!(result.is_empty());
    assert!(result.truncated);
}

#[test]
fn end_past_calendar_range_ends_walk() {
    let event = MasterEvent {
        id: EventId::new("far").unwrap(),
        interval: Interval::new(utc(261_000, 1, 1, 0, 0), utc(262_100, 1, 1, 0, 0)).unwrap(),
        recurrence: Some(RecurrenceRule::new(Frequency::Yearly).with_interval(50)),
    };
    let result = expand(&event, utc(261_000, 6, 1, 0, 0), utc(262_000, 1, 1, 0, 0), 100);
    assert_eq!(starts(&result), vec![utc(261_000, 1, 1, 0, 0)]);
    assert!(!result.truncated);
}

// ===== Fast-forward =====

#[test]
fn fast_forward_reaches_window_behind_cap() {
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = expand_fast_forward(&event, utc(2024, 6, 1, 0, 0), utc(2024, 6, 8, 0, 0), 100);
    assert_eq!(result.len(), 7);
    assert_eq!(starts(&result)[0], utc(2024, 6, 1, 9, 0));
    assert!(!result.truncated);
}

#[test]
fn old_series_still_reaches_distant_window() {
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2020, 1, 1, 9, 0), 60, Some(rule));
    let result =
        expand_fast_forward(&event, utc(2024, 6, 10, 0, 0), utc(2024, 6, 12, 0, 0), 100);
    assert_eq!(
        starts(&result),
        vec![utc(2024, 6, 10, 9, 0), utc(2024, 6, 11, 9, 0)]
    );
    assert!(!result.truncated);
}

#[test]
fn fast_forward_keeps_occurrence_straddling_window_start() {
    let rule = RecurrenceRule::new(Frequency::Daily);
    let event = master(utc(2020, 1, 1, 23, 0), 120, Some(rule));
    let result =
        expand_fast_forward(&event, utc(2024, 6, 10, 0, 0), utc(2024, 6, 10, 12, 0), 100);
    assert_eq!(starts(&result), vec![utc(2024, 6, 9, 23, 0)]);
}

#[test]
fn fast_forward_weekly_weekdays_matches_full_walk() {
    let rule = RecurrenceRule::new(Frequency::Weekly)
        .with_interval(2)
        .with_weekdays([Weekday::Tue, Weekday::Sat]);
    let event = master(utc(2023, 1, 3, 7, 30), 45, Some(rule));

    let window_start = utc(2023, 9, 1, 0, 0);
    let window_end = utc(2023, 10, 1, 0, 0);
    let skipped = expand_fast_forward(&event, window_start, window_end, 100);
    let full = expand(&event, window_start, window_end, 10_000);

    assert_eq!(skipped.occurrences, full.occurrences);
    assert!(!skipped.is_empty());
    for occ in &skipped.occurrences {
        let day = occ.interval.start().weekday();
        assert!(day == Weekday::Tue || day == Weekday::Sat);
    }
}

#[test]
fn fast_forward_monthly_matches_full_walk() {
    let rule = RecurrenceRule::new(Frequency::Monthly).with_month_days([30]);
    let event = master(utc(2001, 1, 30, 6, 0), 60, Some(rule));
    let window_start = utc(2024, 1, 1, 0, 0);
    let window_end = utc(2024, 12, 31, 0, 0);
    let skipped = expand_fast_forward(&event, window_start, window_end, 100);
    let full = expand(&event, window_start, window_end, 100_000);
    assert_eq!(skipped.occurrences, full.occurrences);
    // Every month but February.
    assert_eq!(skipped.len(), 11);
}

#[test]
fn fast_forward_is_ignored_when_count_is_set() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_count(500);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let window = (utc(2024, 6, 1, 0, 0), utc(2024, 6, 8, 0, 0));
    let skipped = expand_fast_forward(&event, window.0, window.1, 100);
    assert_eq!(skipped, expand(&event, window.0, window.1, 100));
    assert!(skipped.truncated);
}

// ===== Keys & validation =====

#[test]
fn repeated_queries_produce_identical_keys() {
    let rule = RecurrenceRule::new(Frequency::Weekly).with_weekdays([Weekday::Mon]);
    let event = master(utc(2024, 3, 4, 9, 0), 60, Some(rule));
    let a = expand(&event, utc(2024, 3, 1, 0, 0), utc(2024, 4, 1, 0, 0), 100);
    let b = expand(&event, utc(2024, 3, 1, 0, 0), utc(2024, 4, 1, 0, 0), 100);
    let keys_a: Vec<_> = a.occurrences.iter().map(|o| &o.instance_key).collect();
    let keys_b: Vec<_> = b.occurrences.iter().map(|o| &o.instance_key).collect();
    assert_eq!(keys_a, keys_b);
}

#[test]
fn try_expand_rejects_invalid_rule() {
    let rule = RecurrenceRule::new(Frequency::Daily)
        .with_count(2)
        .with_until(utc(2024, 2, 1, 0, 0));
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let problems = try_expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 2, 1, 0, 0), 100)
        .unwrap_err();
    assert_eq!(problems, vec![RuleProblem::CountAndUntil]);
}

#[test]
fn try_expand_accepts_valid_rule() {
    let rule = RecurrenceRule::new(Frequency::Daily).with_count(2);
    let event = master(utc(2024, 1, 1, 9, 0), 60, Some(rule));
    let result = try_expand(&event, utc(2024, 1, 1, 0, 0), utc(2024, 2, 1, 0, 0), 100).unwrap();
    assert_eq!(result.len(), 2);
}
