//! Image operations applied to view windows: cropping, outlining,
//! resizing and letterboxing onto a display canvas.

use crate::{
    utils::safe_cast::{i64_to_i32_clamp, i64_to_u32_clamp},
    view_window::{Highlight, PixelRect},
    Error, Result,
};
use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

/// Red, used for the zoom highlight
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Copy the `rect` region out of `image`
///
/// # Errors
///
/// Returns an error if the rectangle is empty or leaves the image
pub fn crop(image: &RgbImage, rect: &PixelRect) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if rect.width == 0 || rect.height == 0 {
        return Err(Error::InvalidInput(format!("Empty crop region {rect:?}")));
    }
    if rect.right() > width || rect.bottom() > height {
        return Err(Error::InvalidInput(format!(
            "Crop region {rect:?} exceeds image {width}x{height}"
        )));
    }

    Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

/// Draw the zoom outline `highlight` with the given stroke thickness
///
/// The stroke is centred on the outline; parts outside the image are clipped.
pub fn draw_highlight(image: &mut RgbImage, highlight: &Highlight, thickness: i64, color: Rgb<u8>) {
    let half = thickness / 2;
    for inset in -half..(thickness - half) {
        let width = highlight.x1 - highlight.x0 - 2 * inset + 1;
        let height = highlight.y1 - highlight.y0 - 2 * inset + 1;
        if width <= 0 || height <= 0 {
            continue;
        }
        let rect = Rect::at(i64_to_i32_clamp(highlight.x0 + inset), i64_to_i32_clamp(highlight.y0 + inset))
            .of_size(i64_to_u32_clamp(width), i64_to_u32_clamp(height));
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Resize to exactly `width` x `height`
///
/// # Errors
///
/// Returns an error if the target size is empty
pub fn resize(image: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!("Invalid resize target {width}x{height}")));
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    Ok(imageops::resize(image, width, height, FilterType::Triangle))
}

/// Center `image` on a black canvas of `width` x `height`
///
/// Images larger than the canvas are clipped.
#[must_use]
pub fn letterbox(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    let x = (i64::from(width) - i64::from(image.width())) / 2;
    let y = (i64::from(height) - i64::from(image.height())) / 2;
    imageops::replace(&mut canvas, image, x, y);
    canvas
}

/// Horizontal gradient with a vertical grid, used when no source image is available
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Values are reduced modulo 256
pub fn test_pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x % 64 == 0 || y % 64 == 0 {
            Rgb([255, 255, 255])
        } else {
            let r = (u64::from(x) * 255 / u64::from(width.max(1))) as u8;
            let g = (u64::from(y) * 255 / u64::from(height.max(1))) as u8;
            Rgb([r, g, 96])
        }
    })
}
