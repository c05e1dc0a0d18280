//! Expansion of a master event into occurrences inside a query window.
//!
//! # Walk
//!
//! Candidates are generated from the master start, one per step:
//!
//! - daily / weekly / monthly / yearly: the k-th candidate is the master start
//!   advanced by `k * interval` units, computed from the origin each time so
//!   month-end starts do not drift. A date that does not exist in the target
//!   month (April 31st, February 29th in a common year) consumes the step and
//!   yields nothing.
//! - weekly with `by_weekday`: the master start, then every later listed
//!   weekday of the same Sunday-based week, then the listed weekdays of the
//!   week `interval` weeks on, and so on.
//!
//! Each candidate must satisfy every present constraint to become an
//! occurrence origin. `count` counts every matching origin of the series,
//! inside the window or not. Origins outside the window are not emitted.
//!
//! The walk stops at the first of: `count` reached, candidate after `until`,
//! candidate after the window end, `max_occurrences` steps taken. Steps before
//! the window count toward `max_occurrences` like any other.
//!
//! [`expand_fast_forward`] is the opt-in variant for long-running series: when
//! the rule has no `count`, whole periods that end before the window are
//! skipped arithmetically and never consume steps.

use super::rule::{Frequency, RecurrenceRule, WeekdaySet};
use super::validate::{validate, RuleProblem};
use crate::model::{Interval, MasterEvent, Occurrence};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

/// Default safety cap on walk steps per master event.
pub const DEFAULT_MAX_OCCURRENCES: usize = 100;

/// Result of expanding one master event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expansion {
    /// Occurrences in strictly increasing start order.
    pub occurrences: Vec<Occurrence>,
    /// True when the step cap ended the walk before any other stop condition.
    pub truncated: bool,
}

impl Expansion {
    /// Number of emitted occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// True when no occurrence overlaps the window.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Drops the truncation flag.
    pub fn into_occurrences(self) -> Vec<Occurrence> {
        self.occurrences
    }
}

/// Expand `master` into the occurrences overlapping `[query_start, query_end]`.
///
/// Never fails: a rule with no frequency behaves like a non-recurring event,
/// degenerate constraints simply match nothing. Use [`try_expand`] to reject
/// invalid rules up front.
pub fn expand(
    master: &MasterEvent,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    max_occurrences: usize,
) -> Expansion {
    expand_with(master, query_start, query_end, max_occurrences, false)
}

/// Like [`expand`], but a rule without `count` starts walking at the first
/// period that can reach the window, so `max_occurrences` bounds the steps
/// taken inside the window only.
///
/// Results inside the window are the same as [`expand`] with a cap large
/// enough to reach it.
pub fn expand_fast_forward(
    master: &MasterEvent,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    max_occurrences: usize,
) -> Expansion {
    expand_with(master, query_start, query_end, max_occurrences, true)
}

fn expand_with(
    master: &MasterEvent,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    max_occurrences: usize,
    fast_forward: bool,
) -> Expansion {
    let window = QueryBounds {
        start: query_start,
        end: query_end,
    };

    let Some((rule, frequency)) = master
        .recurrence
        .as_ref()
        .and_then(|rule| rule.frequency.map(|frequency| (rule, frequency)))
    else {
        return expand_single(master, &window);
    };

    let expansion = walk_series(master, rule, frequency, &window, max_occurrences, fast_forward);
    tracing::debug!(
        event = %master.id,
        fast_forward,
        emitted = expansion.len(),
        truncated = expansion.truncated,
        "expanded recurring event"
    );
    expansion
}

/// Validate the master's rule, then expand.
pub fn try_expand(
    master: &MasterEvent,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    max_occurrences: usize,
) -> Result<Expansion, Vec<RuleProblem>> {
    if let Some(rule) = &master.recurrence {
        let problems = validate(rule);
        if !problems.is_empty() {
            return Err(problems);
        }
    }
    Ok(expand(master, query_start, query_end, max_occurrences))
}

struct QueryBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl QueryBounds {
    fn overlaps(&self, interval: &Interval) -> bool {
        interval.start() < self.end && interval.end() > self.start
    }
}

fn expand_single(master: &MasterEvent, window: &QueryBounds) -> Expansion {
    let occurrences = if window.overlaps(&master.interval) {
        vec![Occurrence::new(master.id.clone(), master.interval)]
    } else {
        Vec::new()
    };
    Expansion {
        occurrences,
        truncated: false,
    }
}

fn walk_series(
    master: &MasterEvent,
    rule: &RecurrenceRule,
    frequency: Frequency,
    window: &QueryBounds,
    max_occurrences: usize,
    fast_forward: bool,
) -> Expansion {
    let mut walk = Walk::new(master.interval.start(), frequency, rule);
    if fast_forward && rule.count.is_none() {
        if let Some(threshold) = window
            .start
            .checked_sub_signed(master.interval.duration())
        {
            walk.skip_periods_before(threshold);
        }
    }

    let mut expansion = Expansion::default();
    let mut matched: u32 = 0;
    let mut steps: usize = 0;

    while let Some(step) = walk.next() {
        if rule.count.is_some_and(|count| matched >= count) {
            break;
        }
        if let Step::Candidate(candidate) = step {
            if rule.until.is_some_and(|until| candidate > until) || candidate > window.end {
                break;
            }
        }
        if steps >= max_occurrences {
            expansion.truncated = true;
            break;
        }
        steps += 1;

        let Step::Candidate(candidate) = step else {
            continue;
        };
        if !matches_constraints(candidate, rule) {
            continue;
        }
        matched += 1;

        // Later candidates only end further out.
        let Some(interval) = master.interval.shifted_to(candidate) else {
            break;
        };
        if window.overlaps(&interval) {
            expansion
                .occurrences
                .push(Occurrence::new(master.id.clone(), interval));
        }
    }

    expansion
}

fn matches_constraints(candidate: DateTime<Utc>, rule: &RecurrenceRule) -> bool {
    if let Some(days) = rule.weekdays() {
        if !days.contains(candidate.weekday()) {
            return false;
        }
    }
    if let Some(days) = rule.month_days() {
        if !days.contains(&(candidate.day() as u8)) {
            return false;
        }
    }
    if let Some(months) = rule.months() {
        if !months.contains(&(candidate.month() as u8)) {
            return false;
        }
    }
    true
}

/// One step of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Candidate(DateTime<Utc>),
    /// The anchor date does not exist in its month.
    Missing,
}

/// Lazily generated candidate instants. Ends only when chrono's range is
/// exhausted.
struct Walk {
    origin: DateTime<Utc>,
    origin_date: NaiveDate,
    time: NaiveTime,
    frequency: Frequency,
    interval: u32,
    weekdays: Option<WeekdaySet>,
    /// Index of the current period (in units of `interval`).
    period: u64,
    /// Weekly-with-weekdays cursor: Sunday offset of the last candidate in
    /// the current week, `None` when the week has not been entered yet.
    last_offset: Option<u32>,
    started: bool,
}

impl Walk {
    fn new(origin: DateTime<Utc>, frequency: Frequency, rule: &RecurrenceRule) -> Self {
        let weekdays = match frequency {
            Frequency::Weekly => rule.weekdays().copied(),
            _ => None,
        };
        Self {
            origin,
            origin_date: origin.date_naive(),
            time: origin.time(),
            frequency,
            interval: rule.effective_interval(),
            weekdays,
            period: 0,
            last_offset: None,
            started: false,
        }
    }

    /// Jump over whole periods whose candidates all start at or before
    /// `threshold`. Only valid when no `count` has to be tallied.
    ///
    /// Period `p` never starts later than `p * period_days` after the origin
    /// and weekly candidates sit at most six days into their week, so every
    /// period before `elapsed / period_days` ends before the threshold.
    fn skip_periods_before(&mut self, threshold: DateTime<Utc>) {
        let elapsed_days = (threshold - self.origin).num_days();
        let period_days = self.frequency.max_period_days() * i64::from(self.interval);
        let skip = elapsed_days / period_days;
        if skip < 1 {
            return;
        }
        self.period = skip as u64;
        self.started = true;
        self.last_offset = None;
    }

    fn advance(&mut self) -> Option<Step> {
        match self.weekdays {
            Some(days) => self.next_weekday(days),
            None => {
                let step = self.anchor(self.period);
                self.period = self.period.checked_add(1)?;
                step
            }
        }
    }

    fn next_weekday(&mut self, days: WeekdaySet) -> Option<Step> {
        if !self.started {
            self.started = true;
            self.last_offset = Some(self.origin.weekday().num_days_from_sunday());
            return Some(Step::Candidate(self.origin));
        }

        let offset = match self.last_offset.and_then(|last| days.next_offset_after(last)) {
            Some(next) => next,
            None => {
                if self.last_offset.is_some() {
                    self.period = self.period.checked_add(1)?;
                }
                days.first_offset()?
            }
        };
        self.last_offset = Some(offset);

        let week_start = self
            .origin_date
            .checked_sub_days(Days::new(u64::from(
                self.origin.weekday().num_days_from_sunday(),
            )))?;
        let days_ahead = self
            .period
            .checked_mul(7 * u64::from(self.interval))?
            .checked_add(u64::from(offset))?;
        let date = week_start.checked_add_days(Days::new(days_ahead))?;
        Some(Step::Candidate(self.at(date)))
    }

    /// Candidate for period `period`, or `None` past chrono's range.
    fn anchor(&self, period: u64) -> Option<Step> {
        let units = period.checked_mul(u64::from(self.interval))?;
        match self.frequency {
            Frequency::Daily => self.after_days(units),
            Frequency::Weekly => self.after_days(units.checked_mul(7)?),
            Frequency::Monthly => self.after_months(i64::try_from(units).ok()?),
            Frequency::Yearly => self.after_months(i64::try_from(units).ok()?.checked_mul(12)?),
        }
    }

    fn after_days(&self, days: u64) -> Option<Step> {
        let date = self.origin_date.checked_add_days(Days::new(days))?;
        Some(Step::Candidate(self.at(date)))
    }

    fn after_months(&self, months: i64) -> Option<Step> {
        let month_index = i64::from(self.origin_date.month0()).checked_add(months)?;
        let year = i64::from(self.origin_date.year()).checked_add(month_index / 12)?;
        let year = i32::try_from(year).ok()?;
        let month = (month_index % 12) as u32 + 1;
        match NaiveDate::from_ymd_opt(year, month, self.origin_date.day()) {
            Some(date) => Some(Step::Candidate(self.at(date))),
            // Either the day does not exist in that month or the year is
            // beyond chrono's range; a valid first-of-month tells them apart.
            None => NaiveDate::from_ymd_opt(year, month, 1).map(|_| Step::Missing),
        }
    }

    fn at(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.time).and_utc()
    }
}

impl Iterator for Walk {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        self.advance()
    }
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
