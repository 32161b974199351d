//! Mapping from calibrated alignment to crop windows on the source image.
//!
//! Alignment values become percentages of their calibrated range, the
//! percentages become pixel midpoints, and the midpoints become crop
//! rectangles that are shifted (never shrunk) to stay inside the image.
//! In zoom mode the crop instead follows an inverse FOV rule: the larger
//! the depth percentage, the narrower the region.

use crate::{
    axis::{Axis, AxisMap},
    constants::{
        FALLBACK_PERCENT, FOV_INVERSION_BASE, PERCENT_MAX, PERCENT_MIN, UNSET_BOUND, ZOOM_HIGHLIGHT_PADDING,
        ZOOM_HIGHLIGHT_THICKNESS,
    },
    utils::{
        image_ops,
        safe_cast::{f64_to_i64_trunc, f64_to_u32_clamp, i64_to_u32_clamp},
    },
    Result,
};
use image::RgbImage;
use std::fmt;

/// Position of `value` inside `[low, high]` as a percentage
///
/// Unset (`-1`) bounds give 50, a bound of exactly 0 gives 0, values
/// outside the range saturate to 0 or 100 and a NaN result falls back to 50.
#[must_use]
#[allow(clippy::float_cmp)] // Sentinels are compared exactly
pub fn percentage_between(value: f64, low: f64, high: f64) -> f64 {
    if high == UNSET_BOUND || low == UNSET_BOUND {
        return FALLBACK_PERCENT;
    }
    if high == 0.0 || low == 0.0 {
        return PERCENT_MIN;
    }
    if value < low {
        return PERCENT_MIN;
    }
    if value > high {
        return PERCENT_MAX;
    }

    let percentage = (value - low) / (high - low) * 100.0;
    if percentage.is_nan() {
        FALLBACK_PERCENT
    } else {
        percentage
    }
}

/// Linearly map `value` from `[source_low, source_high]` to
/// `[target_low, target_high]`, truncated to an integer
///
/// Out-of-domain values clamp to the nearest target bound; NaN maps to 0.
#[must_use]
pub fn map_percent(value: f64, target_high: f64, target_low: f64, source_high: f64, source_low: f64) -> i64 {
    if value < source_low {
        return f64_to_i64_trunc(target_low);
    }
    if value > source_high {
        return f64_to_i64_trunc(target_high);
    }

    let mapped = target_low + (value - source_low) / (source_high - source_low) * (target_high - target_low);
    if mapped.is_nan() {
        0
    } else {
        f64_to_i64_trunc(mapped)
    }
}

/// [`map_percent`] from the default percentage domain onto `[0, target_high]`
#[must_use]
pub fn map_percent_to(value: f64, target_high: f64) -> i64 {
    map_percent(value, target_high, 0.0, PERCENT_MAX, PERCENT_MIN)
}

/// Rectangle in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn from_spans(x: (i64, i64), y: (i64, i64)) -> Self {
        let (x0, x1) = x;
        let (y0, y1) = y;
        Self {
            x: i64_to_u32_clamp(x0),
            y: i64_to_u32_clamp(y0),
            width: i64_to_u32_clamp(x1 - x0),
            height: i64_to_u32_clamp(y1 - y0),
        }
    }
}

/// Place a span of `size` centred on `mid`, shifted back inside `[0, limit]`
fn place_span(mid: i64, size: i64, limit: i64) -> (i64, i64) {
    if size >= limit {
        return (0, limit.max(0));
    }

    let mut start = mid - size / 2;
    let mut end = start + size;
    if end > limit {
        end = limit;
        start = end - size;
    } else if start < 0 {
        start = 0;
        end = size;
    }
    (start, end)
}

/// Crop rectangle of `slice_width` x `slice_height` centred on the given
/// percentage midpoints of a `width` x `height` image
#[must_use]
pub fn compute_crop_window(
    image_size: (u32, u32),
    slice_width: u32,
    slice_height: u32,
    mid_x_percent: f64,
    mid_y_percent: f64,
) -> PixelRect {
    let (width, height) = (i64::from(image_size.0), i64::from(image_size.1));

    let mid_x = map_percent_to(mid_x_percent, width as f64);
    let mid_y = map_percent_to(mid_y_percent, height as f64);

    PixelRect::from_spans(
        place_span(mid_x, i64::from(slice_width), width),
        place_span(mid_y, i64::from(slice_height), height),
    )
}

/// Outline drawn around the zoomed-in region, in FOV region coordinates
///
/// Corners are inclusive and may lie outside the region; drawing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

/// Result of the simulated optical zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovZoom {
    /// Region of the source image shown on the surface
    pub fov_region: PixelRect,
    /// Zoomed-in region, relative to `fov_region`
    pub zoom_region: PixelRect,
    /// Padded outline of `zoom_region`
    pub highlight: Highlight,
    /// FOV after inversion and image-height limiting, in percent of the slice
    pub effective_fov: f64,
}

/// Simulated optical zoom: the FOV region spans
/// `(200 - fov_percent)%` of the slice size, so a higher `fov_percent`
/// narrows the view. The nested zoomed-in region keeps the slice size and
/// aspect ratio and is marked with a padded outline.
#[must_use]
pub fn compute_fov_zoom_window(
    image_size: (u32, u32),
    slice_width: u32,
    slice_height: u32,
    fov_percent: f64,
    mid_x_percent: f64,
    mid_y_percent: f64,
) -> FovZoom {
    let (width, height) = (i64::from(image_size.0), i64::from(image_size.1));
    let (slice_w, slice_h) = (i64::from(slice_width), i64::from(slice_height));

    let mut effective_fov = FOV_INVERSION_BASE - fov_percent;
    let mut fov_height = f64_to_i64_trunc(slice_h as f64 * effective_fov / 100.0);
    if height < fov_height {
        effective_fov = height as f64 / slice_h as f64 * 100.0;
        fov_height = height;
    }

    let mid_y = f64_to_i64_trunc(height as f64 * mid_y_percent / 100.0);
    let end_y = (mid_y + fov_height.div_euclid(2)).min(height);
    let start_y = (end_y - fov_height).max(0);
    let end_y = end_y.max(start_y);

    let fov_width = f64_to_i64_trunc(slice_w as f64 * effective_fov / 100.0);
    let mid_x = f64_to_i64_trunc(width as f64 * mid_x_percent / 100.0);
    let end_x = (mid_x + fov_width).min(width);
    let start_x = (end_x - fov_width).max(0);
    let end_x = end_x.max(start_x);

    // Same aspect ratio as the slice, computed exactly
    let zoom_h = slice_h;
    let zoom_w = if slice_h == 0 { 0 } else { zoom_h * slice_w / slice_h };

    let zoom_end_x = (mid_x + zoom_w).min(width);
    let zoom_start_x = (zoom_end_x - zoom_w).max(0);
    let zoom_end_y = (mid_y + zoom_h.div_euclid(2)).min(height);
    let zoom_start_y = (zoom_end_y - zoom_h).max(0);

    let rect_x = (zoom_start_x - start_x).max(0);
    let rect_y = (zoom_start_y - start_y).max(0);
    let rect_w = (zoom_end_x - zoom_start_x).min(end_x - start_x - rect_x);
    let rect_h = (zoom_end_y - zoom_start_y).min(end_y - start_y - rect_y);

    FovZoom {
        fov_region: PixelRect::from_spans((start_x, end_x), (start_y, end_y)),
        zoom_region: PixelRect::from_spans((rect_x, rect_x + rect_w), (rect_y, rect_y + rect_h)),
        highlight: Highlight {
            x0: rect_x - ZOOM_HIGHLIGHT_PADDING,
            y0: rect_y - ZOOM_HIGHLIGHT_PADDING,
            x1: rect_x + rect_w + ZOOM_HIGHLIGHT_PADDING,
            y1: rect_y + rect_h + ZOOM_HIGHLIGHT_PADDING,
        },
        effective_fov,
    }
}

/// Largest size with the slice's aspect ratio that fits the display
#[must_use]
pub fn fit_to_display(slice_width: u32, slice_height: u32, display_width: u32, display_height: u32) -> (u32, u32) {
    if slice_width == 0 || slice_height == 0 || display_height == 0 {
        return (0, 0);
    }

    let (sw, sh) = (u64::from(slice_width), u64::from(slice_height));
    let (dw, dh) = (u64::from(display_width), u64::from(display_height));

    // Aspect ratios compared by cross-multiplication to stay exact
    if sw * dh > dw * sh {
        (display_width, u32::try_from(dw * sh / sw).unwrap_or(display_height))
    } else {
        (u32::try_from(dh * sw / sh).unwrap_or(display_width), display_height)
    }
}

/// Physical output surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    LeftMirror,
    Windshield,
    RightMirror,
}

impl Surface {
    pub const ALL: [Self; 3] = [Self::LeftMirror, Self::Windshield, Self::RightMirror];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LeftMirror => "left",
            Self::Windshield => "windshield",
            Self::RightMirror => "right",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Crop window of one surface for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub surface: Surface,
    pub start_x: u32,
    pub start_y: u32,
    pub width: u32,
    pub height: u32,
    /// Aspect-correct size on the display
    pub target_width: u32,
    pub target_height: u32,
    /// Zoom outline to draw onto the cropped region
    pub highlight: Option<Highlight>,
}

impl ViewWindow {
    /// Source region as a rectangle
    #[must_use]
    pub const fn region(&self) -> PixelRect {
        PixelRect::new(self.start_x, self.start_y, self.width, self.height)
    }

    /// Crop `image`, draw the zoom outline if any, and scale to the target size
    ///
    /// # Errors
    ///
    /// Returns an error if the window does not fit `image` or is empty
    pub fn render(&self, image: &RgbImage) -> Result<RgbImage> {
        let mut region = image_ops::crop(image, &self.region())?;
        if let Some(h) = self.highlight {
            image_ops::draw_highlight(&mut region, &h, ZOOM_HIGHLIGHT_THICKNESS, image_ops::HIGHLIGHT_COLOR);
        }
        image_ops::resize(&region, self.target_width, self.target_height)
    }
}

/// Static geometry of the mapper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub slice_width: u32,
    pub slice_height: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub left_bias_percent: f64,
    pub right_bias_percent: f64,
    pub zoom: bool,
}

impl ViewSettings {
    /// Slice sized as `slice_height_fraction` of the display height, with
    /// the display's aspect ratio
    #[must_use]
    pub fn for_display(display_width: u32, display_height: u32, slice_height_fraction: f64) -> Self {
        let slice_height = f64_to_u32_clamp(f64::from(display_height) * slice_height_fraction, 1, display_height.max(1));
        let slice_width = u64::from(slice_height) * u64::from(display_width) / u64::from(display_height.max(1));
        let slice_width = u32::try_from(slice_width).unwrap_or(u32::MAX).max(1);

        Self {
            slice_width,
            slice_height,
            display_width,
            display_height,
            left_bias_percent: crate::constants::DEFAULT_LEFT_BIAS_PERCENT,
            right_bias_percent: crate::constants::DEFAULT_RIGHT_BIAS_PERCENT,
            zoom: false,
        }
    }
}

/// Turns per-axis percentages into a [`ViewWindow`] per surface
#[derive(Debug, Clone)]
pub struct ViewWindowMapper {
    settings: ViewSettings,
}

impl ViewWindowMapper {
    #[must_use]
    pub const fn new(settings: ViewSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn set_zoom(&mut self, zoom: bool) {
        self.settings.zoom = zoom;
    }

    /// Horizontal percentage for `surface` after its lateral bias
    #[must_use]
    pub fn biased_x_percent(&self, surface: Surface, x_percent: f64) -> f64 {
        match surface {
            Surface::LeftMirror => x_percent + self.settings.left_bias_percent,
            Surface::RightMirror => x_percent + self.settings.right_bias_percent,
            Surface::Windshield => x_percent,
        }
    }

    /// Window of `surface` over a source image of `image_size`
    #[must_use]
    pub fn map(&self, surface: Surface, image_size: (u32, u32), percent: &AxisMap<f64>) -> ViewWindow {
        let s = &self.settings;

        let (region, highlight) = match surface {
            Surface::Windshield => (PixelRect::new(0, 0, image_size.0, image_size.1), None),
            Surface::LeftMirror | Surface::RightMirror => {
                let x = self.biased_x_percent(surface, percent[Axis::X]);
                if s.zoom {
                    let zoom = compute_fov_zoom_window(
                        image_size,
                        s.slice_width,
                        s.slice_height,
                        percent[Axis::Z],
                        x,
                        percent[Axis::Y],
                    );
                    (zoom.fov_region, Some(zoom.highlight))
                } else {
                    (
                        compute_crop_window(image_size, s.slice_width, s.slice_height, x, percent[Axis::Y]),
                        None,
                    )
                }
            }
        };

        let (target_width, target_height) =
            fit_to_display(region.width, region.height, s.display_width, s.display_height);

        ViewWindow {
            surface,
            start_x: region.x,
            start_y: region.y,
            width: region.width,
            height: region.height,
            target_width,
            target_height,
            highlight,
        }
    }
}
