//! Recurrence rule value types.

use super::rrule::RRuleParseError;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How far one step of the walk advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One day per step.
    Daily,
    /// One week per step, or one listed weekday with `by_weekday`.
    Weekly,
    /// One calendar month per step, same day of month.
    Monthly,
    /// One calendar year per step, same month and day.
    Yearly,
}

impl Frequency {
    /// RRULE `FREQ` token.
    pub fn as_rrule(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Upper bound of one period in days, used to skip whole periods safely.
    pub(crate) fn max_period_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 31,
            Frequency::Yearly => 366,
        }
    }
}

/// Set of weekdays, numbered 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

/// Error for weekday numbers outside 0..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weekday {0} is outside 0 (Sunday) to 6 (Saturday)")]
pub struct InvalidWeekday(pub u8);

impl WeekdaySet {
    /// No weekdays.
    pub const EMPTY: Self = Self(0);

    /// Set of the given days; duplicates are fine.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::EMPTY, |set, day| set.with(day))
    }

    /// Set containing `day` in addition to the current members.
    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | (1 << day.num_days_from_sunday()))
    }

    /// Whether `day` is a member.
    pub fn contains(&self, day: Weekday) -> bool {
        self.contains_offset(day.num_days_from_sunday())
    }

    /// True for [`WeekdaySet::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u32)
            .filter(|offset| self.contains_offset(*offset))
            .map(weekday_from_sunday_offset)
    }

    /// Days-from-Sunday offset of the first member.
    pub(crate) fn first_offset(&self) -> Option<u32> {
        (0..7).find(|offset| self.contains_offset(*offset))
    }

    /// Days-from-Sunday offset of the first member strictly after `offset`
    /// within the same week.
    pub(crate) fn next_offset_after(&self, offset: u32) -> Option<u32> {
        (offset + 1..7).find(|candidate| self.contains_offset(*candidate))
    }

    fn contains_offset(&self, offset: u32) -> bool {
        offset < 7 && self.0 & (1 << offset) != 0
    }
}

pub(crate) fn weekday_from_sunday_offset(offset: u32) -> Weekday {
    match offset % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = InvalidWeekday;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        days.into_iter().try_fold(Self::EMPTY, |set, day| {
            if day > 6 {
                Err(InvalidWeekday(day))
            } else {
                Ok(set.with(weekday_from_sunday_offset(u32::from(day))))
            }
        })
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().map(|d| d.num_days_from_sunday() as u8).collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        Self::from_days(iter)
    }
}

/// Immutable recurrence specification.
///
/// Never carries its own master interval; it is always paired with one
/// through [`MasterEvent`](crate::model::MasterEvent). Field combinations are
/// not checked at construction: run [`validate`](super::validate) first, the
/// expander tolerates any value.
///
/// Deserializes from either a structured map or RRULE text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RuleRepr")]
pub struct RecurrenceRule {
    /// Required; `None` only survives to report it from validation.
    pub frequency: Option<Frequency>,
    /// Steps between candidates, in units of `frequency`.
    pub interval: u32,
    /// Matching origins in the whole series, window or not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Last instant a candidate may start at, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    /// Weekly only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_weekday: Option<WeekdaySet>,
    /// Monthly only, 1-31.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<BTreeSet<u8>>,
    /// Yearly only, 1-12.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month: Option<BTreeSet<u8>>,
}

impl RecurrenceRule {
    /// Rule repeating every period of `frequency` with no other constraints.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency: Some(frequency),
            ..Self::unspecified()
        }
    }

    /// Rule with no frequency, as produced by empty RRULE text.
    pub fn unspecified() -> Self {
        Self {
            frequency: None,
            interval: 1,
            count: None,
            until: None,
            by_weekday: None,
            by_month_day: None,
            by_month: None,
        }
    }

    /// Sets `interval`.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets `count`.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets `until`.
    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Sets `by_weekday`.
    pub fn with_weekdays(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.by_weekday = Some(WeekdaySet::from_days(days));
        self
    }

    /// Sets `by_month_day`.
    pub fn with_month_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.by_month_day = Some(days.into_iter().collect());
        self
    }

    /// Sets `by_month`.
    pub fn with_months(mut self, months: impl IntoIterator<Item = u8>) -> Self {
        self.by_month = Some(months.into_iter().collect());
        self
    }

    /// Interval used by the walk; a zero interval walks as 1.
    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }

    /// Weekday constraint, if present and non-empty.
    pub fn weekdays(&self) -> Option<&WeekdaySet> {
        self.by_weekday.as_ref().filter(|set| !set.is_empty())
    }

    /// Day-of-month constraint, if present and non-empty.
    pub fn month_days(&self) -> Option<&BTreeSet<u8>> {
        self.by_month_day.as_ref().filter(|set| !set.is_empty())
    }

    /// Month constraint, if present and non-empty.
    pub fn months(&self) -> Option<&BTreeSet<u8>> {
        self.by_month.as_ref().filter(|set| !set.is_empty())
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::rrule::format_rrule(self))
    }
}

/// Wire shapes accepted for a rule.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleRepr {
    Text(String),
    Fields(RuleFields),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFields {
    #[serde(default)]
    frequency: Option<Frequency>,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    until: Option<DateTime<Utc>>,
    #[serde(default)]
    by_weekday: Option<WeekdaySet>,
    #[serde(default)]
    by_month_day: Option<BTreeSet<u8>>,
    #[serde(default)]
    by_month: Option<BTreeSet<u8>>,
}

fn default_interval() -> u32 {
    1
}

impl TryFrom<RuleRepr> for RecurrenceRule {
    type Error = RRuleParseError;

    fn try_from(repr: RuleRepr) -> Result<Self, Self::Error> {
        match repr {
            RuleRepr::Text(text) => text.parse(),
            RuleRepr::Fields(fields) => Ok(Self {
                frequency: fields.frequency,
                interval: fields.interval,
                count: fields.count,
                until: fields.until,
                by_weekday: fields.by_weekday,
                by_month_day: fields.by_month_day,
                by_month: fields.by_month,
            }),
        }
    }
}
