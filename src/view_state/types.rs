//! Core windowing value types

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Snapshot of a windowed list, handed to renderers and observers.
///
/// # Invariants
/// - `start_index <= end_index`
/// - `end_index < item count` when the list is non-empty
/// - `visible_indices == start_index..=end_index`, empty for an empty list
/// - `offset_top + height(start..=end) + offset_bottom == total_extent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowingState {
    /// Clamped scroll offset.
    pub scroll_offset: usize,
    /// First rendered index, buffer included.
    pub start_index: usize,
    /// Last rendered index, buffer included.
    pub end_index: usize,
    /// Sum of all item heights.
    pub total_extent: usize,
    /// Extent of the items above `start_index`.
    pub offset_top: usize,
    /// Extent of the items below `end_index`.
    pub offset_bottom: usize,
    /// `start_index..=end_index`, empty for an empty list.
    pub visible_indices: Vec<usize>,
}

impl WindowingState {
    /// True when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.visible_indices.is_empty()
    }
}

/// Source of item heights before measurement.
#[derive(Clone)]
pub enum HeightModel {
    /// Every item has this height.
    Fixed(usize),
    /// Heights are unknown until measured; this estimate stands in.
    Estimated(usize),
    /// Heights come from a per-index function, called once per index.
    Computed(Arc<dyn Fn(usize) -> usize + Send + Sync>),
}

impl HeightModel {
    /// Wraps a height function.
    pub fn computed(f: impl Fn(usize) -> usize + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Initial height of `index`.
    pub fn initial_height(&self, index: usize) -> usize {
        match self {
            HeightModel::Fixed(height) | HeightModel::Estimated(height) => *height,
            HeightModel::Computed(f) => f(index),
        }
    }
}

impl fmt::Debug for HeightModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightModel::Fixed(h) => f.debug_tuple("Fixed").field(h).finish(),
            HeightModel::Estimated(h) => f.debug_tuple("Estimated").field(h).finish(),
            HeightModel::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

impl Subscription {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_model_calls_function() {
        let model = HeightModel::computed(|i| 10 + i);
        assert_eq!(model.initial_height(0), 10);
        assert_eq!(model.initial_height(5), 15);
    }

    #[test]
    fn fixed_and_estimated_are_uniform() {
        assert_eq!(HeightModel::Fixed(40).initial_height(999), 40);
        assert_eq!(HeightModel::Estimated(50).initial_height(3), 50);
    }

    #[test]
    fn debug_hides_closure() {
        let model = HeightModel::computed(|_| 1);
        assert_eq!(format!("{model:?}"), "Computed(..)");
    }

    #[test]
    fn default_state_is_empty() {
        assert!(WindowingState::default().is_empty());
    }
}
