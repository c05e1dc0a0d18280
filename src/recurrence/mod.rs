//! Recurrence rules and their expansion into occurrences.
//!
//! A [`RecurrenceRule`] is pure data attached to a
//! [`MasterEvent`](crate::model::MasterEvent). [`expand`] turns the pair into
//! the occurrences overlapping a query window, bounded by a step cap so an
//! unbounded rule can never hang a query.

mod describe;
mod expand;
mod rrule;
mod rule;
mod validate;

pub use describe::describe;
pub use expand::{expand, expand_fast_forward, try_expand, Expansion, DEFAULT_MAX_OCCURRENCES};
pub use rrule::RRuleParseError;
pub use rule::{Frequency, InvalidWeekday, RecurrenceRule, WeekdaySet};
pub use validate::{validate, RuleProblem};
