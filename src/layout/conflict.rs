//! Conflict annotation: which items overlap which.

use super::{layout_order, LayoutItem};
use std::collections::BTreeMap;

/// For every item, the sorted ids of the other items it overlaps.
///
/// Quadratic in the worst case (everything overlapping everything). Callers
/// bound the input size instead, see `ProcessOptions::max_candidates`.
pub fn annotate_conflicts<K: Ord + Clone>(items: &[LayoutItem<K>]) -> BTreeMap<K, Vec<K>> {
    let order = layout_order(items);
    let mut conflicts: BTreeMap<K, Vec<K>> = items
        .iter()
        .map(|item| (item.id.clone(), Vec::new()))
        .collect();

    for (pos, &i) in order.iter().enumerate() {
        let current = &items[i];
        for &j in &order[pos + 1..] {
            let other = &items[j];
            // Later items start no earlier; once one starts after `current`
            // ends, the rest do too.
            if other.interval.start() >= current.interval.end() {
                break;
            }
            if current.id == other.id || !current.interval.overlaps(&other.interval) {
                continue;
            }
            if let Some(list) = conflicts.get_mut(&current.id) {
                list.push(other.id.clone());
            }
            if let Some(list) = conflicts.get_mut(&other.id) {
                list.push(current.id.clone());
            }
        }
    }

    for list in conflicts.values_mut() {
        list.sort();
        list.dedup();
    }
    conflicts
}
