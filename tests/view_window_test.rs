//! View window geometry and rendering tests

use smart_mirror::{
    axis::{Axis, AxisMap},
    calibration::{AxisRange, AxisRangeModel},
    utils::image_ops,
    view_window::{
        compute_crop_window, compute_fov_zoom_window, fit_to_display, percentage_between, Highlight, PixelRect, Surface,
        ViewSettings, ViewWindowMapper,
    },
    Result,
};

#[test]
fn test_bin_scenario_reaches_last_bin() -> Result<()> {
    let model = AxisRangeModel::new(AxisMap::splat(AxisRange::new(-0.2, 0.2)), 3)?;
    let edges = model.bin_edges(Axis::X);
    let expected = [-0.2, -0.066_666_7, 0.066_666_7, 0.2];
    for (edge, want) in edges.iter().zip(expected) {
        assert!((edge - want).abs() < 1e-6);
    }

    let bin = model.bin_index(Axis::X, 0.15);
    assert_eq!(bin, 2);
    assert_eq!(model.bin_midpoint_index_percent(Axis::X, bin)?, 100.0);
    Ok(())
}

#[test]
fn test_percentage_feeds_crop_position() {
    let low = percentage_between(-0.2, -0.2, 0.2);
    let high = percentage_between(0.2, -0.2, 0.2);

    let left = compute_crop_window((1920, 1080), 768, 432, low, 50.0);
    let right = compute_crop_window((1920, 1080), 768, 432, high, 50.0);
    assert_eq!(left, PixelRect::new(0, 324, 768, 432));
    assert_eq!(right, PixelRect::new(1152, 324, 768, 432));
}

#[test]
fn test_fov_zoom_narrows_with_depth() {
    let wide = compute_fov_zoom_window((1920, 1080), 768, 432, 20.0, 30.0, 50.0);
    let base = compute_fov_zoom_window((1920, 1080), 768, 432, 100.0, 30.0, 50.0);
    let narrow = compute_fov_zoom_window((1920, 1080), 768, 432, 150.0, 30.0, 50.0);

    assert!(wide.fov_region.width > base.fov_region.width);
    assert!(base.fov_region.width > narrow.fov_region.width);
    assert_eq!(base.effective_fov, 100.0);
    assert_eq!((base.fov_region.width, base.fov_region.height), (768, 432));
    assert_eq!(wide.effective_fov, 180.0);
    assert_eq!((wide.fov_region.x, wide.fov_region.width), (538, 1382));

    // 432 * 3 rows would not fit, so the FOV is limited by the image height
    let limited = compute_fov_zoom_window((1920, 1080), 768, 432, -100.0, 30.0, 50.0);
    assert_eq!(limited.fov_region.height, 1080);
    assert!((limited.effective_fov - 250.0).abs() < 1e-9);
}

#[test]
fn test_fit_keeps_aspect_ratio() {
    assert_eq!(fit_to_display(768, 432, 1920, 1080), (1920, 1080));
    assert_eq!(fit_to_display(1000, 1000, 1920, 1080), (1080, 1080));
    assert_eq!(fit_to_display(2000, 500, 1920, 1080), (1920, 480));
}

#[test]
fn test_render_every_surface() -> Result<()> {
    let source = image_ops::test_pattern(1280, 720);
    let mapper = ViewWindowMapper::new(ViewSettings::for_display(640, 360, 0.4));
    let percent = AxisMap::new(25.0, 75.0, 60.0);

    for surface in Surface::ALL {
        let window = mapper.map(surface, source.dimensions(), &percent);
        let image = window.render(&source)?;
        assert_eq!(image.dimensions(), (window.target_width, window.target_height));
        assert_eq!(image.dimensions(), (640, 360), "{surface}");
    }
    Ok(())
}

#[test]
fn test_zoom_render_draws_highlight() -> Result<()> {
    let source = image_ops::test_pattern(1280, 720);
    let mut settings = ViewSettings::for_display(1280, 720, 0.4);
    settings.zoom = true;
    let mapper = ViewWindowMapper::new(settings);

    // Left bias puts the mirror at 0%, depth 50% widens the FOV to 150%
    let window = mapper.map(Surface::LeftMirror, source.dimensions(), &AxisMap::new(50.0, 50.0, 50.0));
    assert_eq!(window.region(), PixelRect::new(0, 144, 768, 432));
    assert_eq!(window.highlight, Some(Highlight { x0: -5, y0: 67, x1: 517, y1: 365 }));

    let mut region = image_ops::crop(&source, &window.region())?;
    image_ops::draw_highlight(&mut region, &Highlight { x0: -5, y0: 67, x1: 517, y1: 365 }, 2, image_ops::HIGHLIGHT_COLOR);
    assert_eq!(*region.get_pixel(10, 67), image_ops::HIGHLIGHT_COLOR);
    assert_eq!(*region.get_pixel(517, 200), image_ops::HIGHLIGHT_COLOR);

    let rendered = window.render(&source)?;
    assert_eq!(rendered.dimensions(), (1280, 720));
    Ok(())
}
