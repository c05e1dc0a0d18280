//! Short English summaries of recurrence rules.

use super::rule::{Frequency, RecurrenceRule};
use chrono::Weekday;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Human-readable summary such as `"Every 2 weeks on Mon, Wed, 10 times"`.
///
/// # Examples
///
/// ```
/// # use calgrid::recurrence::{describe, Frequency, RecurrenceRule};
/// let rule = RecurrenceRule::new(Frequency::Monthly).with_month_days([1, 15]);
/// assert_eq!(describe(&rule), "Monthly on day 1, 15");
/// ```
pub fn describe(rule: &RecurrenceRule) -> String {
    let Some(frequency) = rule.frequency else {
        return "Unspecified frequency".to_string();
    };

    let mut text = cadence(frequency, rule.effective_interval());

    if let Some(days) = rule.weekdays() {
        let names: Vec<&str> = days.iter().map(weekday_abbrev).collect();
        text.push_str(" on ");
        text.push_str(&names.join(", "));
    }
    if let Some(days) = rule.month_days() {
        let days: Vec<String> = days.iter().map(u8::to_string).collect();
        text.push_str(" on day ");
        text.push_str(&days.join(", "));
    }
    if let Some(months) = rule.months() {
        let names: Vec<&str> = months
            .iter()
            .filter_map(|m| MONTH_NAMES.get(usize::from(*m).checked_sub(1)?).copied())
            .collect();
        if !names.is_empty() {
            text.push_str(" in ");
            text.push_str(&names.join(", "));
        }
    }

    match rule.count {
        Some(1) => text.push_str(", once"),
        Some(n) => text.push_str(&format!(", {n} times")),
        None => {}
    }
    if let Some(until) = rule.until {
        text.push_str(&format!(", until {}", until.format("%Y-%m-%d")));
    }

    text
}

fn cadence(frequency: Frequency, interval: u32) -> String {
    if interval == 1 {
        return match frequency {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
        .to_string();
    }
    let unit = match frequency {
        Frequency::Daily => "days",
        Frequency::Weekly => "weeks",
        Frequency::Monthly => "months",
        Frequency::Yearly => "years",
    };
    format!("Every {interval} {unit}")
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}
