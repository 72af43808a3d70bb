//! Hexmask Processing Library
//!
//! Pure, synchronous code: the hexagon mask transform, metadata probing and upload
//! validation.
//! Nothing in this crate performs I/O; callers that run on an async runtime should move
//! the work onto a blocking thread.

pub mod image;
pub mod metadata;
pub mod traits;
pub mod validator;

pub use crate::image::{ensure_png, HexMask, Hexagon, ImageProcessor};
pub use metadata::ImageMetadata;
pub use traits::ImageTransformer;
pub use validator::{MediaValidator, ValidationError};
