//! Local subject extraction without a trained model
//!
//! The subject is assumed to stand near the center of the frame. A circular
//! seed grows through low-gradient pixels of a central region of interest;
//! the mask boundary is then feathered by distance.

use std::collections::VecDeque;

use image::{Rgba, RgbaImage};
use tracing::debug;

/// Central-difference gradient above which a pixel is an edge
pub const EDGE_THRESHOLD: f32 = 0.15;

/// Feather width, in pixels, of the mask boundary
pub const FEATHER_RADIUS: i64 = 8;

/// Region of interest as fractions of (width, height)
const ROI_X: (f32, f32) = (0.2, 0.8);
const ROI_Y: (f32, f32) = (0.1, 0.9);

/// Cut the subject out of `source`; background pixels become fully
/// transparent.
pub fn extract_silhouette(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return RgbaImage::new(width, height);
    }

    let luminance = luminance_map(source);
    let edges = edge_map(&luminance, w, h);
    let mut mask = seed_mask(w, h);
    let grown = grow_mask(&mut mask, &edges, w, h);
    let result = feather(source, &mask);

    debug!(
        width,
        height,
        grown,
        foreground = mask.iter().filter(|m| **m).count(),
        "Silhouette extracted"
    );
    result
}

/// Perceived luminance in [0, 1], row-major
fn luminance_map(source: &RgbaImage) -> Vec<f32> {
    source
        .pixels()
        .map(|p| (0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32) / 255.0)
        .collect()
}

/// Edge flags from central differences; border pixels are never edges
fn edge_map(luminance: &[f32], w: usize, h: usize) -> Vec<bool> {
    let mut edges = vec![false; w * h];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let gx = (luminance[idx + 1] - luminance[idx - 1]).abs();
            let gy = (luminance[idx + w] - luminance[idx - w]).abs();
            edges[idx] = (gx * gx + gy * gy).sqrt() > EDGE_THRESHOLD;
        }
    }
    edges
}

/// Filled circle of radius min(w, h) / 6 on the image center
fn seed_mask(w: usize, h: usize) -> Vec<bool> {
    let mut mask = vec![false; w * h];
    let cx = (w / 2) as i64;
    let cy = (h / 2) as i64;
    let r = (w.min(h) / 6) as i64;

    for y in (cy - r)..(cy + r) {
        for x in (cx - r)..(cx + r) {
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                continue;
            }
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy < r * r {
                mask[y as usize * w + x as usize] = true;
            }
        }
    }
    mask
}

/// Grow the mask one 4-neighbour ring per round, for at most
/// min(w, h) / 3 rounds, into interior ROI pixels that are not edges.
/// Returns the number of rounds that added pixels.
fn grow_mask(mask: &mut [bool], edges: &[bool], w: usize, h: usize) -> usize {
    let max_rounds = w.min(h) / 3;
    let roi_left = (w as f32 * ROI_X.0) as usize;
    let roi_right = (w as f32 * ROI_X.1) as usize;
    let roi_top = (h as f32 * ROI_Y.0) as usize;
    let roi_bottom = (h as f32 * ROI_Y.1) as usize;

    let accepts = |x: usize, y: usize, mask: &[bool]| {
        x >= 1
            && y >= 1
            && x + 1 < w
            && y + 1 < h
            && (roi_left..=roi_right).contains(&x)
            && (roi_top..=roi_bottom).contains(&y)
            && !mask[y * w + x]
            && !edges[y * w + x]
    };

    let mut frontier: VecDeque<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, m)| **m)
        .map(|(i, _)| i)
        .collect();

    let mut rounds = 0;
    while rounds < max_rounds && !frontier.is_empty() {
        let mut next = VecDeque::new();
        for idx in frontier.drain(..) {
            let (x, y) = (idx % w, idx / w);
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx < w && ny < h && accepts(nx, ny, &*mask) {
                    mask[ny * w + nx] = true;
                    next.push_back(ny * w + nx);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        rounds += 1;
        frontier = next;
    }
    rounds
}

/// Alpha proportional to the distance (capped at `FEATHER_RADIUS`) to the
/// nearest background pixel
fn feather(source: &RgbaImage, mask: &[bool]) -> RgbaImage {
    let (width, height) = source.dimensions();
    let (w, h) = (width as i64, height as i64);

    RgbaImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        if !mask[(y * w + x) as usize] {
            return Rgba([0, 0, 0, 0]);
        }

        let mut min_dist = FEATHER_RADIUS + 1;
        for dy in -FEATHER_RADIUS..=FEATHER_RADIUS {
            for dx in -FEATHER_RADIUS..=FEATHER_RADIUS {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                if !mask[(ny * w + nx) as usize] {
                    let dist = ((dx * dx + dy * dy) as f64).sqrt() as i64;
                    min_dist = min_dist.min(dist);
                }
            }
        }

        let alpha = (min_dist * 255 / FEATHER_RADIUS).min(255) as u8;
        let p = source.get_pixel(x as u32, y as u32);
        Rgba([p[0], p[1], p[2], alpha])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_keeps_center_and_clears_border() {
        let photo = RgbaImage::from_pixel(120, 160, Rgba([90, 120, 150, 255]));
        let out = extract_silhouette(&photo);

        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(119, 159)[3], 0);
        assert_eq!(out.get_pixel(5, 80)[3], 0);

        let center = out.get_pixel(60, 80);
        assert_eq!(*center, Rgba([90, 120, 150, 255]));
    }

    #[test]
    fn test_growth_stays_inside_roi() {
        let photo = RgbaImage::from_pixel(100, 100, Rgba([200, 200, 200, 255]));
        let luminance = luminance_map(&photo);
        let edges = edge_map(&luminance, 100, 100);
        let mut mask = seed_mask(100, 100);
        grow_mask(&mut mask, &edges, 100, 100);

        for y in 0..100 {
            for x in 0..100 {
                if mask[y * 100 + x] {
                    assert!((20..=80).contains(&x) && (10..=90).contains(&y), "({}, {})", x, y);
                }
            }
        }
        // Flat image: the whole ROI is reachable within 33 rounds
        assert!(mask[50 * 100 + 20]);
        assert!(mask[10 * 100 + 50]);
    }

    #[test]
    fn test_strong_edge_stops_growth() {
        // Dark ring around the center acts as a wall
        let photo = RgbaImage::from_fn(100, 100, |x, y| {
            let d = ((x as i32 - 50).pow(2) + (y as i32 - 50).pow(2)) as f32;
            if (24.0..27.0).contains(&d.sqrt()) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let out = extract_silhouette(&photo);

        assert!(out.get_pixel(50, 50)[3] > 0);
        assert_eq!(out.get_pixel(50, 85)[3], 0);
        assert_eq!(out.get_pixel(22, 50)[3], 0);
    }

    #[test]
    fn test_feather_ramps_towards_boundary() {
        let photo = RgbaImage::from_pixel(120, 160, Rgba([90, 120, 150, 255]));
        let out = extract_silhouette(&photo);

        // ROI left edge is x = 24; alpha grows with distance into the mask
        let a1 = out.get_pixel(25, 80)[3];
        let a4 = out.get_pixel(28, 80)[3];
        assert!(a1 > 0);
        assert!(a1 < a4);
        assert_eq!(out.get_pixel(40, 80)[3], 255);
    }

    #[test]
    fn test_seed_radius() {
        let mask = seed_mask(60, 60);
        assert!(mask[30 * 60 + 30]);
        assert!(mask[30 * 60 + 21]);
        assert!(!mask[30 * 60 + 20]);
    }

    #[test]
    fn test_tiny_images() {
        for (w, h) in [(1, 1), (2, 2), (5, 3)] {
            let out = extract_silhouette(&RgbaImage::new(w, h));
            assert_eq!(out.dimensions(), (w, h));
            assert!(out.pixels().all(|p| p[3] == 0));
        }
    }
}
