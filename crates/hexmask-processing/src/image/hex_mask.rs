//! Hexagon mask transform
//!
//! Crops the largest centered square out of the source, optionally resizes it to a
//! canonical side length, and makes every pixel outside the inscribed hexagon fully
//! transparent. The result is always a PNG with an alpha channel.

use super::geometry::Hexagon;
use super::processor::{ensure_png, ImageProcessor};
use crate::traits::ImageTransformer;
use hexmask_core::{MaskConfig, TransformError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexMask {
    canonical_size: Option<u32>,
}

impl HexMask {
    pub fn new(canonical_size: Option<u32>) -> Self {
        Self { canonical_size }
    }

    pub fn from_config(config: &MaskConfig) -> Self {
        Self::new(config.canonical_size)
    }

    pub fn canonical_size(&self) -> Option<u32> {
        self.canonical_size
    }

    /// Mask `data` and return the encoded PNG.
    ///
    /// Deterministic: the same input and settings always produce the same bytes.
    pub fn transform(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let img = ImageProcessor::decode(data)?;
        let square = self.square(img)?;

        let mut rgba = square.to_rgba8();
        let cleared = apply_mask(&mut rgba);

        tracing::debug!(
            side = rgba.width(),
            transparent_pixels = cleared,
            "Hexagon mask applied"
        );

        let png = encode_png(rgba)?;
        ensure_png(&png)?;
        Ok(png)
    }

    fn square(&self, img: DynamicImage) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        let side = width.min(height);
        if side == 0 {
            return Err(TransformError::Geometry { width, height });
        }

        let square = if width == height {
            img
        } else {
            let left = (width - side) / 2;
            let top = (height - side) / 2;
            img.crop_imm(left, top, side, side)
        };

        Ok(match self.canonical_size {
            Some(target) if target != side => {
                square.resize_exact(target, target, FilterType::Lanczos3)
            }
            _ => square,
        })
    }
}

impl ImageTransformer for HexMask {
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        HexMask::transform(self, data)
    }
}

impl Default for HexMask {
    fn default() -> Self {
        Self::from_config(&MaskConfig::default())
    }
}

/// Zeroes alpha outside the inscribed hexagon. Color channels are left as they are.
/// Returns the number of pixels cleared.
fn apply_mask(rgba: &mut RgbaImage) -> u64 {
    let hex = Hexagon::inscribed(rgba.width());
    let mut cleared = 0u64;
    for (x, y, pixel) in rgba.enumerate_pixels_mut() {
        if !hex.contains(x, y) {
            pixel[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

fn encode_png(rgba: RgbaImage) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| TransformError::transformation_with_source("PNG encoding failed", e))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn decode(data: &[u8]) -> RgbaImage {
        image::load_from_memory(data).unwrap().to_rgba8()
    }

    fn transparent_count(img: &RgbaImage) -> u64 {
        img.pixels().filter(|p| p[3] == 0).count() as u64
    }

    #[test]
    fn output_is_png_with_canonical_size() {
        let out = HexMask::new(Some(150)).transform(&jpeg(200, 100)).unwrap();
        assert!(hexmask_core::constants::has_png_signature(&out));
        let img = decode(&out);
        assert_eq!(img.dimensions(), (150, 150));
    }

    #[test]
    fn crop_without_resize_keeps_short_side() {
        let out = HexMask::new(None).transform(&jpeg(200, 100)).unwrap();
        assert_eq!(decode(&out).dimensions(), (100, 100));

        let out = HexMask::new(None).transform(&png(30, 70)).unwrap();
        assert_eq!(decode(&out).dimensions(), (30, 30));
    }

    #[test]
    fn transparent_pixels_match_hexagon_complement() {
        for side in [4u32, 17, 64] {
            let out = HexMask::new(None).transform(&png(side, side)).unwrap();
            let img = decode(&out);
            let expected = u64::from(side * side) - Hexagon::interior_pixel_count(side);
            assert_eq!(transparent_count(&img), expected, "side {}", side);
        }
    }

    #[test]
    fn inside_pixels_keep_color_and_alpha() {
        let out = HexMask::new(None).transform(&png(40, 40)).unwrap();
        let img = decode(&out);
        let center = img.get_pixel(20, 20);
        assert_eq!(center.0, [20, 20, 128, 255]);
        // corner loses alpha only
        let corner = img.get_pixel(0, 0);
        assert_eq!(corner.0, [0, 0, 128, 0]);
    }

    #[test]
    fn crop_is_centered() {
        // 60x20 source: the square starts at column 20.
        let out = HexMask::new(None).transform(&png(60, 20)).unwrap();
        let img = decode(&out);
        assert_eq!(img.get_pixel(10, 10).0, [30, 10, 128, 255]);
    }

    #[test]
    fn boundary_pixel_is_opaque() {
        let out = HexMask::new(None).transform(&png(100, 100)).unwrap();
        let img = decode(&out);
        assert_eq!(img.get_pixel(50, 0)[3], 255);
    }

    #[test]
    fn usable_as_transformer_object() {
        let transformer: Box<dyn ImageTransformer> = Box::new(HexMask::new(Some(20)));
        let out = transformer.transform(&jpeg(50, 40)).unwrap();
        assert_eq!(decode(&out).dimensions(), (20, 20));
    }

    #[test]
    fn deterministic_output() {
        let source = jpeg(123, 77);
        let mask = HexMask::default();
        assert_eq!(mask.transform(&source).unwrap(), mask.transform(&source).unwrap());
    }

    #[test]
    fn single_pixel_becomes_transparent() {
        let out = HexMask::new(None).transform(&png(1, 1)).unwrap();
        let img = decode(&out);
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn non_image_is_decode_error() {
        let err = HexMask::default().transform(b"%PDF-1.4 not an image").unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }

    #[test]
    fn truncated_png_is_decode_error() {
        let mut data = png(20, 20);
        data.truncate(30);
        let err = HexMask::default().transform(&data).unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }

    #[test]
    fn from_config_uses_canonical_size() {
        let config = MaskConfig {
            canonical_size: None,
            timeout_seconds: 5,
        };
        assert_eq!(HexMask::from_config(&config).canonical_size(), None);
        assert_eq!(HexMask::default().canonical_size(), Some(150));
    }
}
