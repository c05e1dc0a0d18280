//! WindowingManager - visible slice of a large list for a scroll offset
//!
//! Owned by exactly one view. Callers serialize `handle_scroll` and
//! `update_item_height` themselves (typically one call per frame); the
//! manager does no throttling of its own.

use super::height_index::HeightIndex;
use super::scroll::{clamp_offset, Alignment};
use super::types::{HeightModel, Subscription, WindowingState};
use super::visible_range::VisibleRange;

type Observer = Box<dyn FnMut(&WindowingState) + Send>;

/// Construction parameters for [`WindowingManager`].
#[derive(Debug, Clone)]
pub struct WindowingConfig {
    /// Number of items in the list.
    pub item_count: usize,
    /// Height of the viewport.
    pub container_height: usize,
    /// Extra items rendered on each side of the visible ones.
    pub buffer: usize,
    /// Where unmeasured heights come from.
    pub heights: HeightModel,
}

/// Stateful windowing over `item_count` items.
///
/// Observers are told about every change to the visible range or the total
/// extent, in subscription order.
pub struct WindowingManager {
    model: HeightModel,
    heights: HeightIndex,
    container_height: usize,
    buffer: usize,
    scroll_offset: usize,
    range: Option<VisibleRange>,
    observers: Vec<(Subscription, Observer)>,
    next_subscription: u64,
}

impl WindowingManager {
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::{HeightModel, WindowingConfig, WindowingManager};
    /// let mut manager = WindowingManager::new(WindowingConfig {
    ///     item_count: 1_000,
    ///     container_height: 500,
    ///     buffer: 5,
    ///     heights: HeightModel::Fixed(50),
    /// });
    /// manager.handle_scroll(5_000);
    /// let state = manager.state();
    /// assert_eq!((state.start_index, state.end_index), (95, 114));
    /// assert_eq!(state.total_extent, 50_000);
    /// ```
    pub fn new(config: WindowingConfig) -> Self {
        let heights = build_index(&config.heights, config.item_count);
        let range = VisibleRange::compute(&heights, 0, config.container_height, config.buffer);
        Self {
            model: config.heights,
            heights,
            container_height: config.container_height,
            buffer: config.buffer,
            scroll_offset: 0,
            range,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Moves to `offset`, clamped so the container stays full.
    ///
    /// Returns `true` and notifies observers when the visible range changed.
    pub fn handle_scroll(&mut self, offset: usize) -> bool {
        self.scroll_offset = clamp_offset(offset, self.heights.total(), self.container_height);
        let changed = self.recompute_range();
        if changed {
            let (start, end) = self.state_range();
            tracing::trace!(offset = self.scroll_offset, start, end, "visible range changed");
            self.notify();
        }
        changed
    }

    /// Records a measured height. Out-of-range indices and unchanged heights
    /// are ignored.
    pub fn update_item_height(&mut self, index: usize, height: usize) {
        if !self.heights.set(index, height) {
            return;
        }
        if self.range.is_some_and(|range| range.contains(index)) {
            self.scroll_offset =
                clamp_offset(self.scroll_offset, self.heights.total(), self.container_height);
            self.recompute_range();
        }
        // Total extent always changed.
        self.notify();
    }

    /// Scrolls so `index` lands at `alignment` and returns the applied
    /// offset, or `None` when `index` is out of range.
    pub fn scroll_to_index(&mut self, index: usize, alignment: Alignment) -> Option<usize> {
        let item_height = self.heights.height(index)?;
        let top = self.heights.offset_of(index);
        let target = clamp_offset(
            alignment.target_offset(top, item_height, self.container_height),
            self.heights.total(),
            self.container_height,
        );
        self.handle_scroll(target);
        Some(target)
    }

    /// Changes the number of items. Measured heights of surviving items are
    /// kept, new items start from the height model.
    pub fn set_item_count(&mut self, item_count: usize) {
        if item_count == self.heights.len() {
            return;
        }
        let model = &self.model;
        self.heights = self
            .heights
            .resized(item_count, |i| model.initial_height(i));
        self.reflow();
    }

    /// Resizes the viewport and recomputes the range.
    pub fn set_container_height(&mut self, container_height: usize) {
        if container_height == self.container_height {
            return;
        }
        self.container_height = container_height;
        self.reflow();
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.heights.len()
    }

    /// Sum of all item heights.
    pub fn total_extent(&self) -> usize {
        self.heights.total()
    }

    /// Rendered range, `None` for an empty list.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.range
    }

    /// Snapshot for renderers and observers.
    pub fn state(&self) -> WindowingState {
        let total_extent = self.heights.total();
        match self.range {
            Some(range) => WindowingState {
                scroll_offset: self.scroll_offset,
                start_index: range.start_index,
                end_index: range.end_index,
                total_extent,
                offset_top: self.heights.offset_of(range.start_index),
                offset_bottom: total_extent - self.heights.offset_of(range.end_index + 1),
                visible_indices: range.indices().collect(),
            },
            None => WindowingState {
                scroll_offset: self.scroll_offset,
                total_extent,
                ..WindowingState::default()
            },
        }
    }

    /// Registers an observer. Observers run in subscription order.
    pub fn subscribe(&mut self, observer: impl FnMut(&WindowingState) + Send + 'static) -> Subscription {
        let subscription = Subscription::new(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((subscription, Box::new(observer)));
        subscription
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    fn reflow(&mut self) {
        self.scroll_offset = clamp_offset(self.scroll_offset, self.heights.total(), self.container_height);
        self.recompute_range();
        self.notify();
    }

    fn recompute_range(&mut self) -> bool {
        let range = VisibleRange::compute(
            &self.heights,
            self.scroll_offset,
            self.container_height,
            self.buffer,
        );
        let changed = range != self.range;
        self.range = range;
        changed
    }

    fn state_range(&self) -> (usize, usize) {
        self.range
            .map_or((0, 0), |range| (range.start_index, range.end_index))
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let state = self.state();
        for (_, observer) in &mut self.observers {
            observer(&state);
        }
    }
}

impl std::fmt::Debug for WindowingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowingManager")
            .field("model", &self.model)
            .field("items", &self.heights.len())
            .field("container_height", &self.container_height)
            .field("buffer", &self.buffer)
            .field("scroll_offset", &self.scroll_offset)
            .field("range", &self.range)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn build_index(model: &HeightModel, item_count: usize) -> HeightIndex {
    match model {
        HeightModel::Fixed(height) | HeightModel::Estimated(height) => {
            HeightIndex::uniform(item_count, *height)
        }
        HeightModel::Computed(f) => HeightIndex::from_heights((0..item_count).map(|i| f(i))),
    }
}

#[cfg(test)]
#[path = "windowing_tests.rs"]
mod tests;
