//! Image metadata types

use serde::{Deserialize, Serialize};

/// Image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: u64,
    pub has_alpha: bool,
}

impl ImageMetadata {
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Side of the largest centered square.
    pub fn square_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_helpers() {
        let meta = ImageMetadata {
            width: 200,
            height: 100,
            format: "Jpeg".to_string(),
            size_bytes: 1000,
            has_alpha: false,
        };
        assert!(!meta.is_square());
        assert_eq!(meta.square_side(), 100);
    }
}
