//! Raster decode, encode and whole-image operations

use std::io::Write;
use std::path::Path;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::error::{CompositorError, Result};
use crate::paint::blend_pixel;

/// JPEG quality of composited results
pub const OUTPUT_JPEG_QUALITY: u8 = 92;

/// Channel scale applied to the base photo before the overlay is drawn
pub const BASE_DARKEN_FACTOR: f32 = 0.7;

pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| CompositorError::Decode(e.to_string()))
}

pub fn load(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode as JPEG, dropping alpha
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb: RgbImage = img.convert();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| CompositorError::Encode(e.to_string()))?;
    Ok(out)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
        .map_err(|e| CompositorError::Encode(e.to_string()))?;
    Ok(out)
}

/// Write `bytes` to `path` through a temporary file in the same directory,
/// so readers never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| CompositorError::Io(e.error))?;
    Ok(())
}

/// Scale color channels by `factor`, alpha unchanged
pub fn darken(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] = (px[c] as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Resize to exact dimensions, ignoring aspect ratio
pub fn stretch(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

/// Composite `src` over `dst` at `opacity`. Both rasters must share
/// dimensions; extra pixels of the larger one are ignored.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, opacity: f32) {
    let width = dst.width().min(src.width());
    let height = dst.height().min(src.height());
    for y in 0..height {
        for x in 0..width {
            blend_pixel(dst.get_pixel_mut(x, y), *src.get_pixel(x, y), opacity);
        }
    }
}

/// Opacity for an 8-bit paint alpha
pub fn alpha_to_opacity(alpha: u8) -> f32 {
    alpha as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_darken_scales_rgb_only() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([100, 200, 50, 77]));
        darken(&mut img, BASE_DARKEN_FACTOR);
        assert_eq!(*img.get_pixel(0, 0), Rgba([70, 140, 35, 77]));
    }

    #[test]
    fn test_stretch_ignores_aspect_ratio() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let out = stretch(&img, 30, 7);
        assert_eq!(out.dimensions(), (30, 7));
    }

    #[test]
    fn test_jpeg_round_trip_keeps_dimensions() {
        let img = RgbaImage::from_pixel(16, 12, Rgba([120, 40, 40, 255]));
        let bytes = encode_jpeg(&img, OUTPUT_JPEG_QUALITY).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 12));
        assert_eq!(decoded.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CompositorError::Decode(_)));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
