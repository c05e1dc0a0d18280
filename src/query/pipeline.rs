//! The view pipeline: expand, flatten, cap, lay out, annotate.

use super::options::{LayoutScope, ProcessOptions, QueryWindow};
use crate::layout::{annotate_conflicts, assign_columns, LayoutAssignment, LayoutItem};
use crate::model::{EventId, InstanceKey, MasterEvent, Occurrence};
use crate::recurrence::{expand, expand_fast_forward, validate, RuleProblem};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// A master event skipped because its rule failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEvent {
    /// The skipped master.
    pub id: EventId,
    /// Every problem found in its rule.
    pub problems: Vec<RuleProblem>,
}

/// Everything a renderer needs for one query window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedView {
    /// Ordered by start, longer duration first on ties.
    pub occurrences: Vec<Occurrence>,
    /// Column placement per occurrence; empty when layout is off.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub layout: BTreeMap<InstanceKey, LayoutAssignment>,
    /// Overlapping occurrences per occurrence; empty when detection is off.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicts: BTreeMap<InstanceKey, Vec<InstanceKey>>,
    /// Masters skipped for invalid rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedEvent>,
    /// Masters whose expansion stopped at `max_occurrences`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub truncated_series: Vec<EventId>,
    /// True when the flattened list was cut at `max_candidates`.
    pub candidates_truncated: bool,
}

/// Runs the full pipeline over `events`.
///
/// Deterministic: the same inputs always give the same view, whichever
/// thread runs it.
pub fn process(events: &[MasterEvent], window: &QueryWindow, options: &ProcessOptions) -> ProcessedView {
    let mut view = ProcessedView::default();

    for master in events {
        if !options.expand_recurrence && master.is_recurring() {
            let single = MasterEvent::single(master.id.clone(), master.interval);
            view.occurrences.extend(
                expand(&single, window.start(), window.end(), options.max_occurrences)
                    .into_occurrences(),
            );
            continue;
        }

        if let Some(rule) = &master.recurrence {
            let problems = validate(rule);
            if !problems.is_empty() {
                tracing::warn!(
                    event = %master.id,
                    problems = problems.len(),
                    "skipping event with invalid recurrence rule"
                );
                view.rejected.push(RejectedEvent {
                    id: master.id.clone(),
                    problems,
                });
                continue;
            }
        }

        let walk = if options.fast_forward {
            expand_fast_forward
        } else {
            expand
        };
        let expansion = walk(master, window.start(), window.end(), options.max_occurrences);
        if expansion.truncated {
            view.truncated_series.push(master.id.clone());
        }
        view.occurrences.extend(expansion.into_occurrences());
    }

    view.occurrences
        .sort_by_key(|occ| (occ.interval.start(), Reverse(occ.interval.duration())));
    if view.occurrences.len() > options.max_candidates {
        tracing::debug!(
            candidates = view.occurrences.len(),
            cap = options.max_candidates,
            "truncating candidate list"
        );
        view.occurrences.truncate(options.max_candidates);
        view.candidates_truncated = true;
    }

    if options.assign_columns || options.detect_conflicts {
        for group in layout_groups(&view.occurrences, options.layout_scope) {
            if options.assign_columns {
                view.layout.extend(assign_columns(&group));
            }
            if options.detect_conflicts {
                view.conflicts.extend(annotate_conflicts(&group));
            }
        }
    }

    tracing::debug!(
        events = events.len(),
        occurrences = view.occurrences.len(),
        rejected = view.rejected.len(),
        "processed query window"
    );
    view
}

fn layout_groups(occurrences: &[Occurrence], scope: LayoutScope) -> Vec<Vec<LayoutItem<InstanceKey>>> {
    match scope {
        LayoutScope::Window => vec![occurrences.iter().map(LayoutItem::from).collect()],
        LayoutScope::PerDay => {
            let mut days: BTreeMap<NaiveDate, Vec<LayoutItem<InstanceKey>>> = BTreeMap::new();
            for occ in occurrences {
                days.entry(occ.interval.start().date_naive())
                    .or_default()
                    .push(LayoutItem::from(occ));
            }
            days.into_values().collect()
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
