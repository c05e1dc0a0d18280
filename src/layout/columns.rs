//! Greedy column assignment.
//!
//! Each item goes into the leftmost column whose last placed item ends at or
//! before its start. The result is a left-packed interval colouring; it is not
//! guaranteed to use the minimum number of columns for every input.
//!
//! `total_columns` is computed per item from the columns that actually hold an
//! item overlapping it, so disjoint clusters do not widen each other.

use super::{layout_order, LayoutItem};
use crate::model::Interval;
use serde::Serialize;
use std::collections::BTreeMap;

/// Column placement of one item.
///
/// # Invariants
/// - `column < total_columns`
/// - `total_columns >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayoutAssignment {
    /// Zero-based column, leftmost first.
    pub column: usize,
    /// Columns shared with the items this one overlaps.
    pub total_columns: usize,
}

impl LayoutAssignment {
    /// Left edge as a fraction of the available width.
    pub fn left(&self) -> f64 {
        self.column as f64 / self.total_columns as f64
    }

    /// Width as a fraction of the available width.
    pub fn width(&self) -> f64 {
        1.0 / self.total_columns as f64
    }
}

/// Assign every item a column.
///
/// Items sharing an id collapse to the assignment of the one placed last.
///
/// # Examples
///
/// ```
/// # use calgrid::layout::{assign_columns, LayoutItem};
/// # use calgrid::model::Interval;
/// # use chrono::{TimeZone, Utc};
/// let at = |h, m| Utc.with_ymd_and_hms(2024, 5, 6, h, m, 0).unwrap();
/// let items = vec![
///     LayoutItem::new("a", Interval::new(at(9, 0), at(10, 0)).unwrap()),
///     LayoutItem::new("b", Interval::new(at(9, 30), at(10, 30)).unwrap()),
/// ];
/// let layout = assign_columns(&items);
/// assert_eq!(layout["a"].column, 0);
/// assert_eq!(layout["b"].column, 1);
/// assert_eq!(layout["b"].total_columns, 2);
/// ```
pub fn assign_columns<K: Ord + Clone>(items: &[LayoutItem<K>]) -> BTreeMap<K, LayoutAssignment> {
    let order = layout_order(items);

    // Each column holds intervals in placement order, which is also start
    // and end order since they never overlap.
    let mut columns: Vec<Vec<Interval>> = Vec::new();
    let mut placed: Vec<(usize, usize)> = Vec::with_capacity(items.len());

    for &index in &order {
        let interval = items[index].interval;
        let free = columns.iter().position(|column| {
            column
                .last()
                .is_none_or(|last| !last.overlaps(&interval))
        });
        let column = match free {
            Some(column) => column,
            None => {
                columns.push(Vec::new());
                columns.len() - 1
            }
        };
        columns[column].push(interval);
        placed.push((index, column));
    }

    let mut result = BTreeMap::new();
    for (index, column) in placed {
        let interval = items[index].interval;
        let widest = columns
            .iter()
            .enumerate()
            .rev()
            .find(|(_, intervals)| column_overlaps(intervals, &interval))
            .map_or(column, |(c, _)| c.max(column));
        result.insert(
            items[index].id.clone(),
            LayoutAssignment {
                column,
                total_columns: widest + 1,
            },
        );
    }

    tracing::trace!(
        items = items.len(),
        columns = columns.len(),
        "assigned layout columns"
    );
    result
}

/// Whether any interval in a start-sorted, non-overlapping column overlaps
/// `interval`.
fn column_overlaps(column: &[Interval], interval: &Interval) -> bool {
    let first_ending_after = column.partition_point(|iv| iv.end() <= interval.start());
    column
        .get(first_ending_after)
        .is_some_and(|iv| iv.start() < interval.end())
}

#[cfg(test)]
#[path = "columns_tests.rs"]
mod tests;
