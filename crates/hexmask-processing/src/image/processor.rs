//! Image processor - metadata extraction and validation

use crate::metadata::ImageMetadata;
use hexmask_core::constants::has_png_signature;
use hexmask_core::TransformError;
use image::{ColorType, DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode `data`, guessing the format from its leading bytes.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, TransformError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(TransformError::Decode(
                "unrecognized image format".to_string(),
            ));
        }

        reader
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))
    }

    pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata, TransformError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let img = reader
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();

        Ok(ImageMetadata {
            width,
            height,
            format,
            size_bytes: data.len() as u64,
            has_alpha: has_alpha(img.color()),
        })
    }
}

fn has_alpha(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::La8 | ColorType::Rgba8 | ColorType::La16 | ColorType::Rgba16 | ColorType::Rgba32F
    )
}

/// Fails unless `data` starts with the PNG signature.
pub fn ensure_png(data: &[u8]) -> Result<(), TransformError> {
    if has_png_signature(data) {
        Ok(())
    } else {
        Err(TransformError::transformation(
            "output does not carry a PNG signature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn create_test_image() -> Vec<u8> {
        let img = RgbaImage::from_pixel(100, 60, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buffer
    }

    #[test]
    fn test_extract_metadata() {
        let image_data = create_test_image();

        let metadata = ImageProcessor::extract_metadata(&image_data).unwrap();

        assert_eq!(metadata.width, 100);
        assert_eq!(metadata.height, 60);
        assert_eq!(metadata.format, "Png");
        assert_eq!(metadata.size_bytes, image_data.len() as u64);
        assert!(metadata.has_alpha);
    }

    #[test]
    fn test_extract_metadata_invalid_image() {
        let result = ImageProcessor::extract_metadata(b"not an image");
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_format() {
        let result = ImageProcessor::decode(b"plain text, not pixels");
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_ensure_png() {
        assert!(ensure_png(&create_test_image()).is_ok());
        let err = ensure_png(b"\xFF\xD8\xFF\xE0jpeg").unwrap_err();
        assert_eq!(err.kind(), "transformation");
    }
}
