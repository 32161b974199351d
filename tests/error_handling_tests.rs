//! Error handling tests for all modules

use smart_mirror::{
    axis::{Axis, AxisMap},
    calibration::{AxisRange, AxisRangeModel},
    presenter::{FrameSink, PngSink, SurfaceFrame},
    smoother::SmootherParams,
    utils::{image_ops, safe_cast::*},
    view_window::{PixelRect, Surface, ViewWindow},
    wire::{read_message, HeadPoseMessage},
    Error,
};
use std::io::Cursor;

#[test]
fn test_bin_index_errors() {
    let model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(-0.2, 0.2)), 3).unwrap();

    // Out-of-range indices are rejected, never clamped
    match model.bin_midpoint(Axis::Z, 3) {
        Err(Error::InvalidInput(msg)) => assert!(msg.contains("Bin index 3")),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
    assert!(model.bin_midpoint_index_percent(Axis::X, usize::MAX).is_err());
    assert!(AxisRangeModel::new(AxisMap::splat(AxisRange::new(0.0, 1.0)), 0).is_err());
}

#[test]
fn test_unknown_axis_name() {
    assert_eq!("y".parse::<Axis>().unwrap(), Axis::Y);
    assert!(matches!("w".parse::<Axis>(), Err(Error::InvalidInput(_))));
}

#[test]
fn test_inverted_range_normalised() {
    let mut model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(0.3, -0.3)), 3).unwrap();
    assert_eq!(model.range(Axis::X), AxisRange::new(-0.3, 0.3));

    model.set_range(Axis::Y, 0.5, 0.1);
    assert_eq!(model.range(Axis::Y), AxisRange::new(0.1, 0.5));
}

#[test]
fn test_smoother_param_validation() {
    let params = SmootherParams {
        min_step: 0.01,
        max_step: 0.001,
        smoothing_factor: 0.5,
    };
    assert!(matches!(params.validate(), Err(Error::ConfigError(_))));
    assert!(SmootherParams::default().validate().is_ok());
}

#[test]
fn test_wire_errors() {
    assert!(matches!(read_message(&mut Cursor::new(Vec::new()), 16), Err(Error::Io(_))));
    assert!(matches!(HeadPoseMessage::decode(&[0x90]), Err(Error::Decode(_))));
}

#[test]
fn test_render_outside_image() {
    let source = image_ops::test_pattern(64, 64);
    let window = ViewWindow {
        surface: Surface::LeftMirror,
        start_x: 40,
        start_y: 0,
        width: 40,
        height: 10,
        target_width: 80,
        target_height: 20,
        highlight: None,
    };
    assert!(matches!(window.render(&source), Err(Error::InvalidInput(_))));
    assert!(image_ops::crop(&source, &PixelRect::default()).is_err());
}

#[test]
fn test_png_sink_unwritable_directory() {
    // A regular file cannot hold frames
    let file = std::env::temp_dir().join(format!("smart-mirror-not-a-dir-{}", std::process::id()));
    std::fs::write(&file, b"x").unwrap();
    let result = PngSink::new(file.join("frames"), 1);
    assert!(result.is_err());

    let frame = SurfaceFrame {
        surface: Surface::Windshield,
        sequence: 1,
        image: image_ops::test_pattern(4, 4),
    };
    if let Ok(mut sink) = result {
        assert!(sink.present(&frame).is_err());
    }
    std::fs::remove_file(&file).ok();
}

#[test]
fn test_safe_cast_edges() {
    assert_eq!(f64_to_i64_trunc(f64::NAN), 0);
    assert_eq!(i64_to_u32_clamp(-1), 0);
    assert_eq!(i64_to_i32_clamp(i64::MAX), i32::MAX);
}
