use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::PNG_CONTENT_TYPE;

/// Masking status of an asset.
///
/// `Success` and `Failed` are terminal: no transition leaves them. A new upload creates
/// a new asset instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TransformStatus {
    None,
    Pending,
    Processing,
    Success,
    Failed,
}

impl TransformStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransformStatus::Success | TransformStatus::Failed)
    }

    /// Whether the lifecycle may move an asset from `self` to `next`.
    pub fn can_transition_to(self, next: TransformStatus) -> bool {
        matches!(
            (self, next),
            (TransformStatus::Pending, TransformStatus::Processing)
                | (TransformStatus::Pending, TransformStatus::Success)
                | (TransformStatus::Pending, TransformStatus::Failed)
                | (TransformStatus::Processing, TransformStatus::Success)
                | (TransformStatus::Processing, TransformStatus::Failed)
        )
    }

    /// Status given to a freshly uploaded asset.
    pub fn initial(mask_requested: bool) -> Self {
        if mask_requested {
            TransformStatus::Pending
        } else {
            TransformStatus::None
        }
    }
}

impl Display for TransformStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TransformStatus::None => write!(f, "none"),
            TransformStatus::Pending => write!(f, "pending"),
            TransformStatus::Processing => write!(f, "processing"),
            TransformStatus::Success => write!(f, "success"),
            TransformStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TransformStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(TransformStatus::None),
            "pending" => Ok(TransformStatus::Pending),
            "processing" => Ok(TransformStatus::Processing),
            "success" => Ok(TransformStatus::Success),
            "failed" => Ok(TransformStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid transform status: {}", s)),
        }
    }
}

/// An uploaded binary object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub alt: String,
    /// Storage key of the file this asset currently points at.
    pub filename: String,
    /// Name the file had when it was uploaded.
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub mask_requested: bool,
    pub transform_status: TransformStatus,
    /// Present only when `transform_status` is `Failed`.
    pub transform_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Applies a patch in place. Used by stores that do not push updates down to SQL.
    pub fn apply(&mut self, patch: &AssetPatch) {
        if let Some(filename) = &patch.filename {
            self.filename = filename.clone();
        }
        if let Some(content_type) = &patch.content_type {
            self.content_type = content_type.clone();
        }
        if let Some(file_size) = patch.file_size {
            self.file_size = file_size;
        }
        if let Some(status) = patch.transform_status {
            self.transform_status = status;
        }
        if let Some(error) = &patch.transform_error {
            self.transform_error = error.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Fields for creating an asset. The store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub alt: String,
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub mask_requested: bool,
}

impl NewAsset {
    pub fn initial_status(&self) -> TransformStatus {
        TransformStatus::initial(self.mask_requested)
    }
}

/// Partial update of an asset, applied atomically by the document store.
///
/// `transform_error` is doubly optional: `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
    pub transform_status: Option<TransformStatus>,
    pub transform_error: Option<Option<String>>,
}

impl AssetPatch {
    pub fn processing() -> Self {
        Self {
            transform_status: Some(TransformStatus::Processing),
            transform_error: Some(None),
            ..Default::default()
        }
    }

    /// Points the asset at its masked PNG and marks it `Success`.
    pub fn transformed(filename: impl Into<String>, file_size: i64) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: Some(PNG_CONTENT_TYPE.to_string()),
            file_size: Some(file_size),
            transform_status: Some(TransformStatus::Success),
            transform_error: Some(None),
        }
    }

    /// Marks the asset `Failed`. Touches no other field.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            transform_status: Some(TransformStatus::Failed),
            transform_error: Some(Some(message.into())),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &AssetPatch::default()
    }
}
