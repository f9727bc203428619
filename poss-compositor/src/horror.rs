//! Horror-tone treatment, used when an entity has no overlay asset

use image::RgbaImage;

use crate::paint::{argb, fill, RadialGradient, TRANSPARENT};

/// Darken, vignette, red wash, then a faint green wash near the edges
pub fn apply_horror_tone(original: &RgbaImage) -> RgbaImage {
    let (width, height) = original.dimensions();
    let longest = width.max(height) as f32;
    let mut result = original.clone();

    fill(&mut result, argb(85, 0, 0, 0));

    RadialGradient::centered(
        width,
        height,
        longest * 0.75,
        vec![
            (0.0, TRANSPARENT),
            (0.6, argb(95, 0, 0, 0)),
            (1.0, argb(160, 0, 0, 0)),
        ],
    )
    .paint(&mut result);

    fill(&mut result, argb(35, 200, 0, 0));

    RadialGradient::centered(
        width,
        height,
        longest * 0.9,
        vec![(0.7, TRANSPARENT), (1.0, argb(25, 0, 150, 50))],
    )
    .paint(&mut result);

    result
}
