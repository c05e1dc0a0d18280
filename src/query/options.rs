//! Query window and processing options.

use crate::model::{Interval, IntervalError};
use crate::recurrence::DEFAULT_MAX_OCCURRENCES;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on the flattened occurrence list handed to layout.
pub const DEFAULT_MAX_CANDIDATES: usize = 500;

/// The span of time a view asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryWindow(Interval);

impl QueryWindow {
    /// Fails when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        Interval::new(start, end).map(Self)
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Utc> {
        self.0.start()
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.0.end()
    }

    /// The window as a plain interval.
    pub fn as_interval(&self) -> &Interval {
        &self.0
    }
}

impl From<Interval> for QueryWindow {
    fn from(interval: Interval) -> Self {
        Self(interval)
    }
}

/// How occurrences are grouped before column assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutScope {
    /// One layout across the whole window (day view, agenda).
    #[default]
    Window,
    /// Separate layout per UTC start date (week view columns).
    PerDay,
}

/// Which pipeline steps run and with which bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// When false, recurring masters are treated as their first instance only.
    pub expand_recurrence: bool,
    /// Skip periods before the window for rules without `count`, so the step
    /// cap only limits steps inside the window. Off by default.
    pub fast_forward: bool,
    /// Compute a [`LayoutAssignment`](crate::layout::LayoutAssignment) per occurrence.
    pub assign_columns: bool,
    /// List, per occurrence, the other occurrences overlapping it.
    pub detect_conflicts: bool,
    /// Grouping used by both layout and conflict detection.
    pub layout_scope: LayoutScope,
    /// Walk-step cap per master event.
    pub max_occurrences: usize,
    /// Cap on the flattened occurrence list.
    pub max_candidates: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            expand_recurrence: true,
            fast_forward: false,
            assign_columns: true,
            detect_conflicts: false,
            layout_scope: LayoutScope::Window,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}
