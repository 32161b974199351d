//! Property tests for the tracking and mapping invariants

use proptest::prelude::*;
use smart_mirror::{
    axis::{AlignmentVector, Axis, AxisMap},
    calibration::{AxisRange, AxisRangeModel},
    focus::FocusAreaTracker,
    smoother::{AlignmentSmoother, SmootherParams},
    view_window::{compute_crop_window, map_percent_to, percentage_between},
};
use std::time::{Duration, Instant};

fn finite() -> impl Strategy<Value = f64> {
    -10.0..10.0f64
}

/// Ordered bounds that avoid the 0 and -1 sentinels
fn bounds() -> impl Strategy<Value = (f64, f64)> {
    (0.01..5.0f64, 0.01..5.0f64, prop::bool::ANY).prop_map(|(a, width, negative)| {
        let low = if negative { -a - 1.5 } else { a };
        (low, low + width)
    })
}

proptest! {
    #[test]
    fn prop_percentage_within_bounds(value in finite(), (low, high) in bounds()) {
        let p = percentage_between(value, low, high);
        prop_assert!((0.0..=100.0).contains(&p));
        if value <= low {
            prop_assert_eq!(p, 0.0);
        }
        if value >= high {
            prop_assert_eq!(p, 100.0);
        }
    }

    #[test]
    fn prop_map_percent_monotonic(a in -50.0..150.0f64, b in -50.0..150.0f64, size in 1u32..4000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let target = f64::from(size);
        prop_assert!(map_percent_to(lo, target) <= map_percent_to(hi, target));
    }

    #[test]
    fn prop_map_percent_clamped_input_idempotent(value in -50.0..150.0f64, size in 1u32..4000) {
        let target = f64::from(size);
        let clamped = value.clamp(0.0, 100.0);
        prop_assert_eq!(map_percent_to(value, target), map_percent_to(clamped, target));
    }

    #[test]
    fn prop_smoother_never_overshoots(
        start in prop::array::uniform3(finite()),
        target in prop::array::uniform3(finite()),
        steps in 1usize..50,
    ) {
        let target = AlignmentVector::from(target);
        let mut smoother = AlignmentSmoother::new(AlignmentVector::from(start), SmootherParams::default());
        for _ in 0..steps {
            let before = smoother.alignment();
            let after = smoother.step(&target);
            for i in 0..3 {
                prop_assert!((after[i] - target[i]).abs() <= (before[i] - target[i]).abs());
                // Same side of the target or on it
                prop_assert!((after[i] - target[i]) * (before[i] - target[i]) >= 0.0);
            }
        }
    }

    #[test]
    fn prop_extend_only_widens(values in prop::collection::vec((0usize..3, finite()), 1..40)) {
        let mut model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(-0.1, 0.1)), 3).unwrap();
        for (axis, value) in values {
            let axis = Axis::ALL[axis];
            let before = model.range(axis);
            model.extend(axis, value);
            let after = model.range(axis);
            prop_assert!(after.contains_range(&before));
            prop_assert!(after.min <= value && value <= after.max);
        }
    }

    #[test]
    fn prop_bin_percent_extremes(n_bins in 2usize..12, (low, high) in bounds()) {
        let model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(low, high)), n_bins).unwrap();
        prop_assert_eq!(model.bin_midpoint_index_percent(Axis::X, 0).unwrap(), 0.0);
        let last = model.bin_edges(Axis::X).len() - 2;
        prop_assert_eq!(model.bin_midpoint_index_percent(Axis::X, last).unwrap(), 100.0);
        prop_assert!(model.bin_midpoint_index_percent(Axis::X, n_bins).is_err());
    }

    #[test]
    fn prop_bin_index_saturates(value in finite(), n_bins in 1usize..12) {
        let model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(-0.2, 0.2)), n_bins).unwrap();
        prop_assert!(model.bin_index(Axis::Y, value) < n_bins);
    }

    #[test]
    fn prop_debounce_holds_bin_inside_dead_time(offset_ms in 0u64..100) {
        let model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(-0.2, 0.2)), 3).unwrap();
        let mut tracker = FocusAreaTracker::new(1, Duration::from_millis(100)).unwrap();
        let t0 = Instant::now();

        tracker.push_sample(AlignmentVector::new(-0.15, 0.0, 0.0));
        tracker.compute_active_focus_areas(&model, t0);
        let latched = tracker.state(Axis::X);

        tracker.push_sample(AlignmentVector::new(0.15, 0.0, 0.0));
        let areas = tracker.compute_active_focus_areas(&model, t0 + Duration::from_millis(offset_ms));
        prop_assert_eq!(areas[Axis::X], Some(0));
        prop_assert_eq!(tracker.state(Axis::X), latched);
    }

    #[test]
    fn prop_crop_window_inside_image(
        width in 1u32..4000,
        height in 1u32..4000,
        slice_w in 1u32..4000,
        slice_h in 1u32..4000,
        mid_x in -50.0..150.0f64,
        mid_y in -50.0..150.0f64,
    ) {
        let rect = compute_crop_window((width, height), slice_w, slice_h, mid_x, mid_y);
        prop_assert!(rect.right() <= width);
        prop_assert!(rect.bottom() <= height);
        prop_assert_eq!(rect.width, slice_w.min(width));
        prop_assert_eq!(rect.height, slice_h.min(height));
    }
}
