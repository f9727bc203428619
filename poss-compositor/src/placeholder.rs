//! Placeholder overlay generator
//!
//! Writes procedurally drawn overlays so the compositor has assets to work
//! with before real artwork exists.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tracing::info;

use crate::error::Result;
use crate::overlay::{CameraOrientation, DEFAULT_OVERLAY_PREFIX, OVERLAY_EXTENSION};
use crate::paint::{argb, blend_pixel, fill, RadialGradient, TRANSPARENT};
use crate::raster;

pub const PLACEHOLDER_WIDTH: u32 = 800;
pub const PLACEHOLDER_HEIGHT: u32 = 1200;

const SYMBOL_RADIUS: f32 = 150.0;
const SYMBOL_STROKE: f32 = 8.0;
const SYMBOL_COLOR: Rgba<u8> = argb(180, 200, 0, 0);

/// Entity drawn with a crossed circle instead of a pentagram
const CROSSED_SYMBOL_ENTITY: &str = "legiao";

/// Dark translucent overlay with a red vignette and the entity symbol
pub fn entity_overlay(entity_id: &str) -> RgbaImage {
    let (width, height) = (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    let mut img = RgbaImage::new(width, height);

    fill(&mut img, argb(120, 20, 0, 20));
    RadialGradient::centered(
        width,
        height,
        width as f32 * 0.6,
        vec![
            (0.0, TRANSPARENT),
            (0.5, argb(80, 100, 0, 0)),
            (1.0, argb(160, 50, 0, 0)),
        ],
    )
    .paint(&mut img);

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    stroke_circle(&mut img, center, SYMBOL_RADIUS);

    let (cx, cy) = center;
    let r = SYMBOL_RADIUS;
    if entity_id == CROSSED_SYMBOL_ENTITY {
        stroke_line(&mut img, (cx - r, cy - r), (cx + r, cy + r));
        stroke_line(&mut img, (cx + r, cy - r), (cx - r, cy + r));
    } else {
        let step = std::f32::consts::TAU / 5.0;
        let vertex = |i: usize| {
            let angle = step * i as f32 - std::f32::consts::FRAC_PI_2;
            (cx + r * angle.cos(), cy + r * angle.sin())
        };
        for i in 0..5 {
            stroke_line(&mut img, vertex(i), vertex(i + 2));
        }
    }

    img
}

/// Generic dark overlay with a soft vignette
pub fn default_overlay() -> RgbaImage {
    let (width, height) = (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    let mut img = RgbaImage::new(width, height);

    fill(&mut img, argb(100, 0, 0, 0));
    RadialGradient::centered(
        width,
        height,
        width as f32 * 0.7,
        vec![(0.0, TRANSPARENT), (1.0, argb(120, 0, 0, 0))],
    )
    .paint(&mut img);

    img
}

/// Write `{entity}_{camera}.png` for every entity and orientation, plus
/// `default_{camera}.png` for every orientation. Returns the written paths.
pub fn generate_placeholder_overlays(dir: &Path, entity_ids: &[&str]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for entity_id in entity_ids {
        let png = raster::encode_png(&entity_overlay(entity_id))?;
        for camera in CameraOrientation::ALL {
            let path = dir.join(format!("{}_{}.{}", entity_id, camera, OVERLAY_EXTENSION));
            raster::write_atomic(&path, &png)?;
            info!(path = %path.display(), "Placeholder overlay written");
            written.push(path);
        }
    }

    let png = raster::encode_png(&default_overlay())?;
    for camera in CameraOrientation::ALL {
        let path = dir.join(format!("{}_{}.{}", DEFAULT_OVERLAY_PREFIX, camera, OVERLAY_EXTENSION));
        raster::write_atomic(&path, &png)?;
        info!(path = %path.display(), "Placeholder overlay written");
        written.push(path);
    }

    Ok(written)
}

fn stroke_circle(img: &mut RgbaImage, center: (f32, f32), radius: f32) {
    let reach = radius + SYMBOL_STROKE;
    let bounds = (center.0 - reach, center.1 - reach, center.0 + reach, center.1 + reach);
    stroke(img, bounds, |x, y| {
        let d = ((x - center.0).powi(2) + (y - center.1).powi(2)).sqrt();
        (d - radius).abs()
    });
}

fn stroke_line(img: &mut RgbaImage, from: (f32, f32), to: (f32, f32)) {
    let bounds = (
        from.0.min(to.0) - SYMBOL_STROKE,
        from.1.min(to.1) - SYMBOL_STROKE,
        from.0.max(to.0) + SYMBOL_STROKE,
        from.1.max(to.1) + SYMBOL_STROKE,
    );
    stroke(img, bounds, |x, y| distance_to_segment((x, y), from, to));
}

/// Paint `SYMBOL_COLOR` where `distance` is within half the stroke width,
/// with a one-pixel antialiased fringe
fn stroke<F>(img: &mut RgbaImage, bounds: (f32, f32, f32, f32), distance: F)
where
    F: Fn(f32, f32) -> f32,
{
    let (width, height) = img.dimensions();
    let x0 = bounds.0.floor().max(0.0) as u32;
    let y0 = bounds.1.floor().max(0.0) as u32;
    let x1 = (bounds.2.ceil().max(0.0) as u32).min(width);
    let y1 = (bounds.3.ceil().max(0.0) as u32).min(height);
    let half = SYMBOL_STROKE / 2.0;

    for y in y0..y1 {
        for x in x0..x1 {
            let d = distance(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(img.get_pixel_mut(x, y), SYMBOL_COLOR, coverage);
            }
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (qx, qy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{find_overlay, DirOverlayStore};

    #[test]
    fn test_distance_to_segment() {
        assert_eq!(distance_to_segment((5.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 3.0);
        assert_eq!(distance_to_segment((13.0, 4.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
    }

    #[test]
    fn test_symbols_differ_by_entity() {
        let crossed = entity_overlay("legiao");
        let pentagram = entity_overlay("pazuzu");
        assert_eq!(crossed.dimensions(), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));

        // The X passes through the center, the pentagram does not
        let center = (PLACEHOLDER_WIDTH / 2, PLACEHOLDER_HEIGHT / 2);
        assert!(crossed.get_pixel(center.0, center.1)[0] > pentagram.get_pixel(center.0, center.1)[0]);

        // Both draw the circle
        let on_circle = (center.0 + SYMBOL_RADIUS as u32, center.1);
        assert_eq!(crossed.get_pixel(on_circle.0, on_circle.1), pentagram.get_pixel(on_circle.0, on_circle.1));
    }

    #[test]
    fn test_generated_overlays_are_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let written = generate_placeholder_overlays(dir.path(), &["legiao"]).unwrap();
        assert_eq!(written.len(), 4);

        let store = DirOverlayStore::new(dir.path());
        let (name, img) = find_overlay(&store, "legiao", CameraOrientation::Rear).unwrap();
        assert_eq!(name, "legiao_traseira.png");
        assert_eq!(img.dimensions(), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));

        let (name, _) = find_overlay(&store, "ghul", CameraOrientation::Front).unwrap();
        assert_eq!(name, "default_frontal.png");
    }
}
