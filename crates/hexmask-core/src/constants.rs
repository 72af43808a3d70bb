//! Shared constants.

/// First eight bytes of every PNG file.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// MIME type written on an asset once it has been masked.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Side length, in pixels, that masked outputs are normalized to.
pub const DEFAULT_CANONICAL_SIZE: u32 = 150;

/// Title used for a hex image whose source filename has no stem.
pub const UNTITLED: &str = "Untitled";

/// Returns true when `data` starts with the PNG signature.
pub fn has_png_signature(data: &[u8]) -> bool {
    data.len() >= PNG_SIGNATURE.len() && data[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_signature_detection() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"IHDR");
        assert!(has_png_signature(&png));
        assert!(has_png_signature(&PNG_SIGNATURE));
        assert!(!has_png_signature(&PNG_SIGNATURE[..7]));
        assert!(!has_png_signature(b"\xFF\xD8\xFF\xE0JFIF"));
        assert!(!has_png_signature(&[]));
    }
}
