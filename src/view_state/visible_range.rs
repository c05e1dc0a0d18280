//! Visible range calculation

use super::height_index::HeightIndex;
use std::ops::RangeInclusive;

/// Inclusive range of item indices to render, buffer included.
///
/// # Invariants
/// - `start_index <= end_index`
/// - `end_index < item count` at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    /// First index, inclusive.
    pub start_index: usize,
    /// Last index, inclusive.
    pub end_index: usize,
}

impl VisibleRange {
    /// # Panics
    /// In debug builds, panics if start_index > end_index.
    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(
            start_index <= end_index,
            "start_index {start_index} > end_index {end_index}"
        );
        Self {
            start_index,
            end_index,
        }
    }

    /// Number of indices in the range. Never zero.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Whether `index` is inside the range.
    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    /// Every index in the range.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }

    /// Computes the range for a scroll offset.
    ///
    /// The first visible item is the one whose span contains `scroll_offset`,
    /// the last is the one containing the container's bottom edge; each end is
    /// then widened by `buffer` items. Offsets past the end show the last
    /// item. Returns `None` for an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::height_index::HeightIndex;
    /// # use calgrid::view_state::visible_range::VisibleRange;
    /// let heights = HeightIndex::uniform(1_000, 50);
    /// let range = VisibleRange::compute(&heights, 5_000, 500, 5).unwrap();
    /// assert_eq!(range, VisibleRange::new(95, 114));
    /// ```
    pub fn compute(
        heights: &HeightIndex,
        scroll_offset: usize,
        container_height: usize,
        buffer: usize,
    ) -> Option<Self> {
        let last = heights.len().checked_sub(1)?;
        let first_visible = heights.lower_bound(scroll_offset).unwrap_or(last);
        let last_visible = match container_height {
            0 => first_visible,
            height => heights
                .lower_bound(scroll_offset.saturating_add(height - 1))
                .unwrap_or(last),
        };

        Some(Self::new(
            first_visible.saturating_sub(buffer),
            last_visible.saturating_add(buffer).min(last),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_range() {
        assert_eq!(VisibleRange::compute(&HeightIndex::default(), 0, 500, 5), None);
    }

    #[test]
    fn top_of_list_clamps_buffer_at_zero() {
        let heights = HeightIndex::uniform(100, 50);
        let range = VisibleRange::compute(&heights, 0, 500, 5).unwrap();
        assert_eq!(range, VisibleRange::new(0, 14));
    }

    #[test]
    fn bottom_of_list_clamps_buffer_at_last() {
        let heights = HeightIndex::uniform(100, 50);
        let range = VisibleRange::compute(&heights, 4_500, 500, 5).unwrap();
        assert_eq!(range, VisibleRange::new(85, 99));
    }

    #[test]
    fn offset_past_end_shows_last_item() {
        let heights = HeightIndex::uniform(10, 50);
        let range = VisibleRange::compute(&heights, 10_000, 100, 0).unwrap();
        assert_eq!(range, VisibleRange::new(9, 9));
    }

    #[test]
    fn partially_visible_items_are_included() {
        let heights = HeightIndex::from_heights([100, 100, 100, 100]);
        let range = VisibleRange::compute(&heights, 150, 100, 0).unwrap();
        assert_eq!(range, VisibleRange::new(1, 2));
    }

    #[test]
    fn contains_and_len() {
        let range = VisibleRange::new(3, 7);
        assert_eq!(range.len(), 5);
        assert!(range.contains(3));
        assert!(range.contains(7));
        assert!(!range.contains(8));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn new_panics_when_start_greater_than_end() {
        VisibleRange::new(10, 5);
    }
}
