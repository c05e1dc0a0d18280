//! Column layout and conflict detection for overlapping intervals.
//!
//! # Module Structure
//!
//! - `columns`: greedy column assignment with per-cluster column counts
//! - `conflict`: per-item list of overlapping items
//!
//! Both work on the same ordering: start ascending, longer duration first on
//! ties, input order otherwise.

mod columns;
mod conflict;

pub use columns::{assign_columns, LayoutAssignment};
pub use conflict::annotate_conflicts;

use crate::model::{Interval, Occurrence};
use std::cmp::Reverse;

/// An identified interval to lay out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem<K> {
    /// Key of the item in the result maps.
    pub id: K,
    /// Span used for overlap tests.
    pub interval: Interval,
}

impl<K> LayoutItem<K> {
    /// Pairs an id with its interval.
    pub fn new(id: K, interval: Interval) -> Self {
        Self { id, interval }
    }
}

impl From<&Occurrence> for LayoutItem<crate::model::InstanceKey> {
    fn from(occ: &Occurrence) -> Self {
        Self::new(occ.instance_key.clone(), occ.interval)
    }
}

/// Indices of `items` in layout order. Stable for equal keys.
pub(crate) fn layout_order<K>(items: &[LayoutItem<K>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| {
        let interval = &items[i].interval;
        (interval.start(), Reverse(interval.duration()))
    });
    order
}
