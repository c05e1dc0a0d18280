//! Tests for WindowingManager.

use super::*;
use std::sync::{Arc, Mutex};

fn fixed(item_count: usize, height: usize, container_height: usize, buffer: usize) -> WindowingManager {
    WindowingManager::new(WindowingConfig {
        item_count,
        container_height,
        buffer,
        heights: HeightModel::Fixed(height),
    })
}

fn record(manager: &mut WindowingManager) -> (Subscription, Arc<Mutex<Vec<WindowingState>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = manager.subscribe(move |state| sink.lock().unwrap().push(state.clone()));
    (subscription, seen)
}

// ===== Scrolling =====

#[test]
fn thousand_fixed_items_scrolled_to_5000() {
    let mut manager = fixed(1_000, 50, 500, 5);
    assert!(manager.handle_scroll(5_000));

    let state = manager.state();
    assert_eq!(state.start_index, 95);
    assert_eq!(state.end_index, 114);
    assert_eq!(state.total_extent, 50_000);
    assert_eq!(state.scroll_offset, 5_000);
    assert_eq!(state.visible_indices, (95..=114).collect::<Vec<_>>());
    assert_eq!(state.offset_top, 95 * 50);
    assert_eq!(state.offset_bottom, 50_000 - 115 * 50);
}

#[test]
fn initial_state_starts_at_top() {
    let manager = fixed(1_000, 50, 500, 5);
    let state = manager.state();
    assert_eq!((state.start_index, state.end_index), (0, 14));
    assert_eq!(state.offset_top, 0);
}

#[test]
fn scroll_within_same_range_reports_no_change() {
    let mut manager = fixed(1_000, 50, 500, 5);
    assert!(manager.handle_scroll(5_010));
    assert!(!manager.handle_scroll(5_020));
}

#[test]
fn scroll_past_end_is_clamped() {
    let mut manager = fixed(100, 50, 500, 2);
    manager.handle_scroll(1_000_000);
    let state = manager.state();
    assert_eq!(state.scroll_offset, 4_500);
    assert_eq!(state.end_index, 99);
    assert_eq!(state.start_index, 88);
    assert_eq!(state.offset_bottom, 0);
}

#[test]
fn short_list_shows_everything() {
    let manager = fixed(3, 50, 500, 5);
    let state = manager.state();
    assert_eq!(state.visible_indices, vec![0, 1, 2]);
}

#[test]
fn empty_list_has_empty_visible_range() {
    let mut manager = fixed(0, 50, 500, 5);
    assert!(!manager.handle_scroll(100));
    let state = manager.state();
    assert!(state.is_empty());
    assert_eq!(state.total_extent, 0);
    assert_eq!(state.scroll_offset, 0);
    assert_eq!(manager.scroll_to_index(0, Alignment::Start), None);
}

// ===== Height measurement =====

#[test]
fn measured_height_inside_range_recomputes_range() {
    let mut manager = fixed(100, 50, 500, 0);
    assert_eq!(manager.visible_range(), Some(VisibleRange::new(0, 9)));

    manager.update_item_height(2, 300);

    assert_eq!(manager.total_extent(), 5_000 + 250);
    assert_eq!(manager.visible_range(), Some(VisibleRange::new(0, 4)));
}

#[test]
fn measured_height_outside_range_only_changes_extent() {
    let mut manager = fixed(100, 50, 500, 0);
    let (_, seen) = record(&mut manager);

    manager.update_item_height(50, 100);

    assert_eq!(manager.visible_range(), Some(VisibleRange::new(0, 9)));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].total_extent, 5_050);
}

#[test]
fn stale_or_unchanged_measurements_are_ignored() {
    let mut manager = fixed(10, 50, 200, 0);
    let (_, seen) = record(&mut manager);

    manager.update_item_height(10, 999);
    manager.update_item_height(3, 50);

    assert_eq!(manager.total_extent(), 500);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn estimated_heights_are_replaced_by_measurements() {
    let mut manager = WindowingManager::new(WindowingConfig {
        item_count: 4,
        container_height: 100,
        buffer: 0,
        heights: HeightModel::Estimated(50),
    });
    assert_eq!(manager.total_extent(), 200);
    manager.update_item_height(0, 20);
    manager.update_item_height(1, 20);
    assert_eq!(manager.total_extent(), 140);
    // 20 + 20 + 50 leaves the fourth item partly visible.
    assert_eq!(manager.visible_range(), Some(VisibleRange::new(0, 3)));
}

#[test]
fn computed_heights_feed_the_index() {
    let manager = WindowingManager::new(WindowingConfig {
        item_count: 4,
        container_height: 100,
        buffer: 0,
        heights: HeightModel::computed(|i| (i + 1) * 10),
    });
    assert_eq!(manager.total_extent(), 100);
    assert_eq!(manager.state().visible_indices, vec![0, 1, 2, 3]);
}

// ===== scroll_to_index =====

#[test]
fn scroll_to_index_alignments() {
    let mut manager = fixed(100, 50, 300, 0);
    assert_eq!(manager.scroll_to_index(10, Alignment::Start), Some(500));
    assert_eq!(manager.scroll_to_index(10, Alignment::End), Some(250));
    assert_eq!(manager.scroll_to_index(10, Alignment::Center), Some(375));
}

#[test]
fn scroll_to_index_applies_offset() {
    let mut manager = fixed(100, 50, 300, 0);
    manager.scroll_to_index(40, Alignment::Start);
    let state = manager.state();
    assert_eq!(state.scroll_offset, 2_000);
    assert_eq!(state.start_index, 40);
}

#[test]
fn scroll_to_last_index_is_clamped() {
    let mut manager = fixed(100, 50, 300, 0);
    assert_eq!(manager.scroll_to_index(99, Alignment::Start), Some(4_700));
    assert!(manager.state().visible_indices.contains(&99));
}

#[test]
fn scroll_to_out_of_range_index_is_noop() {
    let mut manager = fixed(100, 50, 300, 0);
    manager.handle_scroll(1_000);
    assert_eq!(manager.scroll_to_index(100, Alignment::Start), None);
    assert_eq!(manager.state().scroll_offset, 1_000);
}

// ===== Reconfiguration =====

#[test]
fn shrinking_item_count_clamps_offset() {
    let mut manager = fixed(100, 50, 500, 0);
    manager.handle_scroll(4_000);
    manager.set_item_count(20);
    let state = manager.state();
    assert_eq!(state.total_extent, 1_000);
    assert_eq!(state.scroll_offset, 500);
    assert_eq!(state.end_index, 19);
}

#[test]
fn growing_item_count_keeps_measurements() {
    let mut manager = fixed(2, 50, 500, 0);
    manager.update_item_height(1, 80);
    manager.set_item_count(4);
    assert_eq!(manager.total_extent(), 50 + 80 + 50 + 50);
    assert_eq!(manager.item_count(), 4);
}

#[test]
fn container_resize_recomputes_range() {
    let mut manager = fixed(100, 50, 500, 0);
    manager.set_container_height(100);
    assert_eq!(manager.visible_range(), Some(VisibleRange::new(0, 1)));
}

// ===== Observers =====

#[test]
fn observers_run_in_subscription_order() {
    let mut manager = fixed(1_000, 50, 500, 5);
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second"] {
        let order = Arc::clone(&order);
        manager.subscribe(move |_| order.lock().unwrap().push(name));
    }

    manager.handle_scroll(5_000);

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn observers_only_hear_real_changes() {
    let mut manager = fixed(1_000, 50, 500, 5);
    let (_, seen) = record(&mut manager);

    manager.handle_scroll(5_010);
    manager.handle_scroll(5_020);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].start_index, 95);
}

#[test]
fn unsubscribed_observer_is_not_called() {
    let mut manager = fixed(1_000, 50, 500, 5);
    let (subscription, seen) = record(&mut manager);

    assert!(manager.unsubscribe(subscription));
    assert!(!manager.unsubscribe(subscription));
    manager.handle_scroll(5_000);

    assert!(seen.lock().unwrap().is_empty());
}
