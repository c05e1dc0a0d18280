//! RRULE text form (`FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;COUNT=10`).
//!
//! Covers the subset of RFC 5545 that [`RecurrenceRule`] models. Unknown keys
//! are ignored so rules exported by richer tools still load; values of known
//! keys must parse.

use super::rule::{weekday_from_sunday_offset, Frequency, RecurrenceRule, WeekdaySet};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];
const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Errors from parsing RRULE text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RRuleParseError {
    /// A `;`-separated part had no `=`.
    #[error("RRULE part {0:?} is not KEY=VALUE")]
    MalformedPart(String),

    /// `FREQ` is not DAILY, WEEKLY, MONTHLY or YEARLY.
    #[error("unknown FREQ value {0:?}")]
    InvalidFrequency(String),

    /// A numeric part did not parse.
    #[error("{key} value {value:?} is not a non-negative integer")]
    InvalidNumber {
        /// RRULE key, e.g. `COUNT`.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// A `BYDAY` entry is not a two-letter weekday.
    #[error("BYDAY value {0:?} is not one of SU, MO, TU, WE, TH, FR, SA")]
    InvalidWeekday(String),

    /// `UNTIL` is not RFC 3339, `YYYYMMDD` or `YYYYMMDDTHHMMSSZ`.
    #[error("UNTIL value {0:?} is not a UTC date or date-time")]
    InvalidUntil(String),
}

impl FromStr for RecurrenceRule {
    type Err = RRuleParseError;

    /// # Examples
    ///
    /// ```
    /// # use calgrid::recurrence::{Frequency, RecurrenceRule};
    /// let rule: RecurrenceRule = "FREQ=MONTHLY;BYMONTHDAY=1,15;COUNT=6".parse().unwrap();
    /// assert_eq!(rule.frequency, Some(Frequency::Monthly));
    /// assert_eq!(rule.count, Some(6));
    /// ```
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let text = text.strip_prefix("RRULE:").unwrap_or(text);
        let mut rule = RecurrenceRule::unspecified();

        for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RRuleParseError::MalformedPart(part.to_string()))?;
            let value = value.trim();

            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => rule.frequency = Some(parse_frequency(value)?),
                "INTERVAL" => rule.interval = parse_number("INTERVAL", value)?,
                "COUNT" => rule.count = Some(parse_number("COUNT", value)?),
                "UNTIL" => rule.until = Some(parse_until(value)?),
                "BYDAY" => rule.by_weekday = Some(parse_weekdays(value)?),
                "BYMONTHDAY" => rule.by_month_day = Some(parse_list("BYMONTHDAY", value)?),
                "BYMONTH" => rule.by_month = Some(parse_list("BYMONTH", value)?),
                other => {
                    tracing::debug!(key = other, "ignoring unsupported RRULE key");
                }
            }
        }

        Ok(rule)
    }
}

/// Render a rule as RRULE text. `INTERVAL` is omitted when it is 1.
pub(crate) fn format_rrule(rule: &RecurrenceRule) -> String {
    let mut parts = Vec::new();

    if let Some(frequency) = rule.frequency {
        parts.push(format!("FREQ={}", frequency.as_rrule()));
    }
    if rule.interval != 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }
    if let Some(count) = rule.count {
        parts.push(format!("COUNT={count}"));
    }
    if let Some(until) = rule.until {
        parts.push(format!("UNTIL={}", until.format(UNTIL_FORMAT)));
    }
    if let Some(days) = rule.weekdays() {
        let codes: Vec<&str> = days
            .iter()
            .map(|d| WEEKDAY_CODES[d.num_days_from_sunday() as usize])
            .collect();
        parts.push(format!("BYDAY={}", codes.join(",")));
    }
    if let Some(days) = rule.month_days() {
        parts.push(format!("BYMONTHDAY={}", join_numbers(days)));
    }
    if let Some(months) = rule.months() {
        parts.push(format!("BYMONTH={}", join_numbers(months)));
    }

    parts.join(";")
}

fn join_numbers(values: &BTreeSet<u8>) -> String {
    values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_frequency(value: &str) -> Result<Frequency, RRuleParseError> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        _ => Err(RRuleParseError::InvalidFrequency(value.to_string())),
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, RRuleParseError> {
    value.parse().map_err(|_| RRuleParseError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn parse_list(key: &'static str, value: &str) -> Result<BTreeSet<u8>, RRuleParseError> {
    value
        .split(',')
        .map(|item| parse_number(key, item.trim()))
        .collect()
}

fn parse_weekdays(value: &str) -> Result<WeekdaySet, RRuleParseError> {
    value.split(',').try_fold(WeekdaySet::EMPTY, |set, code| {
        let code = code.trim().to_ascii_uppercase();
        WEEKDAY_CODES
            .iter()
            .position(|known| *known == code)
            .map(|offset| set.with(weekday_from_sunday_offset(offset as u32)))
            .ok_or(RRuleParseError::InvalidWeekday(code))
    })
}

fn parse_until(value: &str) -> Result<DateTime<Utc>, RRuleParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, UNTIL_FORMAT) {
        return Ok(naive.and_utc());
    }
    // Date-only UNTIL is inclusive of the whole day.
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RRuleParseError::InvalidUntil(value.to_string()))
}
