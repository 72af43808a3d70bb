//! Image processing module
//!
//! - Hexagon geometry (geometry)
//! - Hexagon mask transform (hex_mask)
//! - Metadata extraction and output checks (processor)

pub mod geometry;
pub mod hex_mask;
pub mod processor;

pub use geometry::Hexagon;
pub use hex_mask::HexMask;
pub use processor::{ensure_png, ImageProcessor};
