//! Master events and the occurrences derived from them.

use super::{EventId, InstanceKey, Interval};
use crate::recurrence::RecurrenceRule;
use serde::{Deserialize, Serialize};

/// Canonical, possibly recurring event definition.
///
/// Owned by the caller; expansion only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEvent {
    /// Caller-assigned identifier.
    pub id: EventId,
    /// First instance; later ones keep its duration.
    pub interval: Interval,
    /// `None` for a one-off event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl MasterEvent {
    /// Non-recurring event.
    pub fn single(id: EventId, interval: Interval) -> Self {
        Self {
            id,
            interval,
            recurrence: None,
        }
    }

    /// Event repeating by `rule` from `interval`.
    pub fn recurring(id: EventId, interval: Interval, rule: RecurrenceRule) -> Self {
        Self {
            id,
            interval,
            recurrence: Some(rule),
        }
    }

    /// True when a rule is attached, valid or not.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// One concrete materialization of a master event.
///
/// Ephemeral: recomputed per query window and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// Master event this occurrence came from.
    pub source_id: EventId,
    /// Master duration, moved to this occurrence's start.
    pub interval: Interval,
    /// Unique per master and start instant.
    pub instance_key: InstanceKey,
}

impl Occurrence {
    /// Occurrence of `source_id` spanning `interval`, keyed by its start.
    pub fn new(source_id: EventId, interval: Interval) -> Self {
        let instance_key = InstanceKey::derive(&source_id, interval.start());
        Self {
            source_id,
            interval,
            instance_key,
        }
    }
}
