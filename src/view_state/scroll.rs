//! Scroll alignment and offset clamping

use serde::{Deserialize, Serialize};

/// Where a scrolled-to item should land in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Item top at the container top.
    #[default]
    Start,
    /// Item centre at the container centre.
    Center,
    /// Item bottom at the container bottom.
    End,
}

impl Alignment {
    /// Unclamped scroll offset placing an item at `item_top` with
    /// `item_height` according to this alignment. Never negative.
    pub fn target_offset(&self, item_top: usize, item_height: usize, container_height: usize) -> usize {
        match self {
            Alignment::Start => item_top,
            Alignment::Center => {
                (item_top + item_height / 2).saturating_sub(container_height / 2)
            }
            Alignment::End => (item_top + item_height).saturating_sub(container_height),
        }
    }
}

/// Largest offset that still fills the container: `max(0, total - container)`.
pub fn max_scroll_offset(total_extent: usize, container_height: usize) -> usize {
    total_extent.saturating_sub(container_height)
}

/// Clamps `offset` to `[0, max_scroll_offset]`.
///
/// Ensures no blank container regardless of the requested position.
pub fn clamp_offset(offset: usize, total_extent: usize, container_height: usize) -> usize {
    offset.min(max_scroll_offset(total_extent, container_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_start() {
        assert_eq!(Alignment::default(), Alignment::Start);
    }

    #[test]
    fn start_alignment_uses_item_top() {
        assert_eq!(Alignment::Start.target_offset(500, 50, 300), 500);
    }

    #[test]
    fn end_alignment_puts_item_bottom_at_container_bottom() {
        // (500 + 50) - 300
        assert_eq!(Alignment::End.target_offset(500, 50, 300), 250);
    }

    #[test]
    fn center_alignment_centres_item() {
        // 500 + 25 - 150
        assert_eq!(Alignment::Center.target_offset(500, 50, 300), 375);
    }

    #[test]
    fn alignment_near_top_saturates_at_zero() {
        assert_eq!(Alignment::End.target_offset(0, 50, 300), 0);
        assert_eq!(Alignment::Center.target_offset(50, 50, 300), 0);
    }

    #[test]
    fn clamp_keeps_container_full() {
        assert_eq!(clamp_offset(9_999, 1_000, 300), 700);
        assert_eq!(clamp_offset(100, 1_000, 300), 100);
    }

    #[test]
    fn clamp_to_zero_when_container_exceeds_content() {
        assert_eq!(clamp_offset(50, 100, 300), 0);
        assert_eq!(max_scroll_offset(100, 300), 0);
    }

    #[test]
    fn alignment_parses_lowercase() {
        let parsed: Alignment = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(parsed, Alignment::Center);
    }
}
