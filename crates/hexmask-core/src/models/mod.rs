pub mod asset;
pub mod hex_image;

pub use asset::{Asset, AssetPatch, NewAsset, TransformStatus};
pub use hex_image::{title_from_filename, HexImage, NewHexImage};
