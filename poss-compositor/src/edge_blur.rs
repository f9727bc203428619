//! Edge feathering: sharp center, progressively blurred borders

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::paint::{blend_pixel, RadialGradient, OPAQUE_WHITE, TRANSPARENT};

/// Downscale divisor of the blur-by-resampling copy
pub const BLUR_FACTOR: u32 = 25;

/// Mask radius as a fraction of the center-to-corner distance
pub const MASK_RADIUS_FRACTION: f32 = 0.65;

/// Mask stops, as fractions of the mask radius: sharp up to the first,
/// fully blurred from the second
pub const MASK_START: f32 = 0.5;
pub const MASK_END: f32 = 1.0;

/// Blur copy of `source`: shrink by `BLUR_FACTOR` (at least 2x2), then
/// scale back up
pub fn blur_by_resampling(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let tiny_w = (width / BLUR_FACTOR).max(2);
    let tiny_h = (height / BLUR_FACTOR).max(2);
    let small = imageops::resize(source, tiny_w, tiny_h, FilterType::Triangle);
    imageops::resize(&small, width, height, FilterType::Triangle)
}

/// Radial mask whose alpha is 0 in the center and 255 at the borders
pub fn feather_mask(width: u32, height: u32) -> RadialGradient {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_radius = (cx * cx + cy * cy).sqrt();
    RadialGradient::new(
        (cx, cy),
        max_radius * MASK_RADIUS_FRACTION,
        vec![(MASK_START, TRANSPARENT), (MASK_END, OPAQUE_WHITE)],
    )
}

/// Composite the radially masked blur copy over the sharp source
pub fn feather_edges(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return source.clone();
    }

    let blurred = blur_by_resampling(source);
    let mask = feather_mask(width, height);

    let mut result = source.clone();
    for (x, y, px) in result.enumerate_pixels_mut() {
        let coverage = mask.pixel_color(x, y)[3] as f32 / 255.0;
        if coverage <= 0.0 {
            continue;
        }
        // Destination-in: the mask only scales the blurred copy's alpha
        let mut masked = *blurred.get_pixel(x, y);
        masked[3] = (masked[3] as f32 * coverage).round() as u8;
        blend_pixel(px, masked, 1.0);
    }
    result
}
