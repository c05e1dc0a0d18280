//! View-state layer - windowing of large lists
//!
//! Decides which slice of a long, variable-height list is on screen for a
//! scroll offset. Rendering is somebody else's job; this layer only tracks
//! heights and offsets.
//!
//! # Module Structure
//!
//! - `types`: WindowingState, HeightModel, Subscription
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `scroll`: Alignment and offset clamping
//! - `visible_range`: VisibleRange - result of visible range calculation
//! - `windowing`: WindowingManager - stateful manager owned by one view

pub mod height_index;
pub mod scroll;
pub mod types;
pub mod visible_range;
pub mod windowing;

pub use scroll::Alignment;
pub use types::{HeightModel, Subscription, WindowingState};
pub use visible_range::VisibleRange;
pub use windowing::{WindowingConfig, WindowingManager};
