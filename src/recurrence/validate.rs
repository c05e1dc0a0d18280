//! Rule validation, one finding per problem.

use super::rule::{Frequency, RecurrenceRule};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A single problem with a recurrence rule.
///
/// Problems are reported individually so a form can point at each field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleProblem {
    /// No frequency given.
    #[error("frequency is required")]
    MissingFrequency,

    /// `interval` is 0.
    #[error("interval must be at least 1")]
    IntervalTooSmall,

    /// `count` is 0.
    #[error("count must be at least 1")]
    CountTooSmall,

    /// Both `count` and `until` are set.
    #[error("count and until are mutually exclusive; specify only one")]
    CountAndUntil,

    /// `by_weekday` on a non-weekly rule.
    #[error("by_weekday only applies to weekly rules")]
    WeekdaysRequireWeekly,

    /// `by_month_day` on a non-monthly rule.
    #[error("by_month_day only applies to monthly rules")]
    MonthDaysRequireMonthly,

    /// `by_month` on a non-yearly rule.
    #[error("by_month only applies to yearly rules")]
    MonthsRequireYearly,

    /// A `by_month_day` value outside 1-31.
    #[error("month day {0} is outside 1-31")]
    MonthDayOutOfRange(u8),

    /// A `by_month` value outside 1-12.
    #[error("month {0} is outside 1-12")]
    MonthOutOfRange(u8),
}

impl Serialize for RuleProblem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check a rule before expansion. An empty list means the rule is valid.
///
/// # Examples
///
/// ```
/// # use calgrid::recurrence::{validate, Frequency, RecurrenceRule, RuleProblem};
/// # use chrono::{TimeZone, Utc};
/// let rule = RecurrenceRule::new(Frequency::Daily)
///     .with_count(5)
///     .with_until(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
/// assert_eq!(validate(&rule), vec![RuleProblem::CountAndUntil]);
/// ```
pub fn validate(rule: &RecurrenceRule) -> Vec<RuleProblem> {
    let mut problems = Vec::new();

    if rule.frequency.is_none() {
        problems.push(RuleProblem::MissingFrequency);
    }
    if rule.interval < 1 {
        problems.push(RuleProblem::IntervalTooSmall);
    }
    if rule.count == Some(0) {
        problems.push(RuleProblem::CountTooSmall);
    }
    if rule.count.is_some() && rule.until.is_some() {
        problems.push(RuleProblem::CountAndUntil);
    }

    if rule.weekdays().is_some() && rule.frequency != Some(Frequency::Weekly) {
        problems.push(RuleProblem::WeekdaysRequireWeekly);
    }
    if let Some(days) = rule.month_days() {
        if rule.frequency != Some(Frequency::Monthly) {
            problems.push(RuleProblem::MonthDaysRequireMonthly);
        }
        problems.extend(
            days.iter()
                .filter(|d| !(1..=31).contains(*d))
                .map(|d| RuleProblem::MonthDayOutOfRange(*d)),
        );
    }
    if let Some(months) = rule.months() {
        if rule.frequency != Some(Frequency::Yearly) {
            problems.push(RuleProblem::MonthsRequireYearly);
        }
        problems.extend(
            months
                .iter()
                .filter(|m| !(1..=12).contains(*m))
                .map(|m| RuleProblem::MonthOutOfRange(*m)),
        );
    }

    problems
}
