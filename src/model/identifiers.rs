//! Core identifier newtypes with smart constructors.
//!
//! Event identifiers validate non-empty strings at construction time.
//! Instance keys are always derived, never parsed from user input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a master event, owned by the caller's storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Smart constructor: validates non-empty id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidEventId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidEventId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventId {
    type Error = InvalidEventId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Stable key of one occurrence: `"{source_id}_{start_millis}"`.
///
/// The same master event and start instant always produce the same key,
/// so renderers can diff occurrence lists across queries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Derive the key for an occurrence of `source` starting at `start`.
    pub fn derive(source: &EventId, start: DateTime<Utc>) -> Self {
        Self(format!("{}_{}", source.as_str(), start.timestamp_millis()))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the start instant encoded in the key.
    ///
    /// Returns `None` when the suffix after the last `_` is not a
    /// millisecond timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::model::{EventId, InstanceKey};
    /// # use chrono::{TimeZone, Utc};
    /// let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    /// let key = InstanceKey::derive(&EventId::new("standup").unwrap(), start);
    /// assert_eq!(key.start(), Some(start));
    /// ```
    pub fn start(&self) -> Option<DateTime<Utc>> {
        let (_, millis) = self.0.rsplit_once('_')?;
        let millis: i64 = millis.parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Error returned by [`EventId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEventId {
    /// The id was the empty string.
    #[error("Event ID cannot be empty")]
    Empty,
}

// ===== Tests =====
