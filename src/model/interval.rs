//! Half-open time interval on the UTC axis.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Error returned when an interval would be empty or inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interval start {start} must be before end {end}")]
pub struct IntervalError {
    /// Requested start.
    pub start: DateTime<Utc>,
    /// Requested end, at or before `start`.
    pub end: DateTime<Utc>,
}

/// A `[start, end)` span of absolute time.
///
/// # Invariants
/// - `start < end`, enforced by [`Interval::new`] and by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Smart constructor: rejects `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(IntervalError { start, end })
        }
    }

    /// Interval of `duration` beginning at `start`.
    ///
    /// An end past chrono's range is reported as an error with `end` saturated
    /// to the latest representable instant.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, IntervalError> {
        match start.checked_add_signed(duration) {
            Some(end) => Self::new(start, end),
            None => Err(IntervalError {
                start,
                end: DateTime::<Utc>::MAX_UTC,
            }),
        }
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Always strictly positive.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `a.start < b.end && a.end > b.start`. Touching intervals do not overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::model::Interval;
    /// # use chrono::{TimeZone, Utc};
    /// let at = |h| Utc.with_ymd_and_hms(2024, 5, 6, h, 0, 0).unwrap();
    /// let a = Interval::new(at(9), at(10)).unwrap();
    /// let b = Interval::new(at(10), at(11)).unwrap();
    /// assert!(!a.overlaps(&b));
    /// ```
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Same length interval moved to begin at `start`, or `None` when the
    /// moved end falls past chrono's range.
    pub fn shifted_to(&self, start: DateTime<Utc>) -> Option<Self> {
        let end = start.checked_add_signed(self.duration())?;
        Some(Self { start, end })
    }
}
