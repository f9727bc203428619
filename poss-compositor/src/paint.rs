//! Canvas primitives on straight-alpha RGBA rasters
//!
//! Colors are `Rgba<u8>` with non-premultiplied alpha. Every paint
//! operation composites with source-over.

use image::{Rgba, RgbaImage};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Color from alpha-first components
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

/// Composite `src` over `dst`, with `src` alpha further scaled by `opacity`
/// (0.0..=1.0).
pub fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
    let sa = src[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = TRANSPARENT;
        return;
    }

    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Paint a flat color over the whole raster
pub fn fill(img: &mut RgbaImage, color: Rgba<u8>) {
    for px in img.pixels_mut() {
        blend_pixel(px, color, 1.0);
    }
}

/// Radial gradient with clamped ends.
///
/// Stop positions are fractions of `radius` in ascending order. Distances
/// below the first stop take the first color, beyond the last stop the
/// last color.
#[derive(Debug, Clone)]
pub struct RadialGradient {
    center: (f32, f32),
    radius: f32,
    stops: Vec<(f32, Rgba<u8>)>,
}

impl RadialGradient {
    pub fn new(center: (f32, f32), radius: f32, stops: Vec<(f32, Rgba<u8>)>) -> Self {
        Self {
            center,
            radius,
            stops,
        }
    }

    /// Gradient centered on the raster
    pub fn centered(width: u32, height: u32, radius: f32, stops: Vec<(f32, Rgba<u8>)>) -> Self {
        Self::new((width as f32 / 2.0, height as f32 / 2.0), radius, stops)
    }

    /// Gradient color at a canvas position
    pub fn color_at(&self, x: f32, y: f32) -> Rgba<u8> {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return TRANSPARENT;
        };

        let dx = x - self.center.0;
        let dy = y - self.center.1;
        let t = if self.radius > 0.0 {
            (dx * dx + dy * dy).sqrt() / self.radius
        } else {
            f32::INFINITY
        };

        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.stops.windows(2) {
            let (p0, c0) = pair[0];
            let (p1, c1) = pair[1];
            if t <= p1 {
                let span = p1 - p0;
                let f = if span > 0.0 { (t - p0) / span } else { 1.0 };
                return lerp(c0, c1, f);
            }
        }
        last.1
    }

    /// Color sampled at the center of pixel (x, y)
    pub fn pixel_color(&self, x: u32, y: u32) -> Rgba<u8> {
        self.color_at(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Paint the gradient over the whole raster
    pub fn paint(&self, img: &mut RgbaImage) {
        for (x, y, px) in img.enumerate_pixels_mut() {
            blend_pixel(px, self.pixel_color(x, y), 1.0);
        }
    }
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, f: f32) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for (i, v) in out.iter_mut().enumerate() {
        let value = a[i] as f32 + (b[i] as f32 - a[i] as f32) * f;
        *v = value.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}
