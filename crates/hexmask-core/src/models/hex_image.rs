use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::TransformStatus;
use crate::constants::UNTITLED;

/// User-facing record presenting a masked asset.
///
/// `transform_status` and `hex_url` are derived on every read from the referenced asset
/// and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexImage {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub asset_id: Uuid,
    pub transform_status: TransformStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a hex image.
#[derive(Debug, Clone)]
pub struct NewHexImage {
    pub title: String,
    pub description: String,
    pub asset_id: Uuid,
}

impl NewHexImage {
    /// Record titled after the uploaded file, with an empty description.
    pub fn for_asset(asset_id: Uuid, original_filename: &str) -> Self {
        Self {
            title: title_from_filename(original_filename),
            description: String::new(),
            asset_id,
        }
    }
}

/// Strips the last extension from a filename; falls back to `Untitled`.
pub fn title_from_filename(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    let stem = stem.trim();
    if stem.is_empty() {
        UNTITLED.to_string()
    } else {
        stem.to_string()
    }
}
