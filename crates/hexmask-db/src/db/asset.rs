use chrono::{DateTime, Utc};
use hexmask_core::models::{Asset, AssetPatch, NewAsset, TransformStatus};
use hexmask_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const ASSET_COLUMNS: &str = "id, alt, filename, original_filename, content_type, file_size, \
     mask_requested, transform_status, transform_error, created_at, updated_at";

/// Row type for the assets table.
#[derive(Debug, sqlx::FromRow)]
pub struct AssetRow {
    pub id: Uuid,
    pub alt: String,
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub mask_requested: bool,
    pub transform_status: TransformStatus,
    pub transform_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRow {
    pub fn to_asset(self) -> Asset {
        Asset {
            id: self.id,
            alt: self.alt,
            filename: self.filename,
            original_filename: self.original_filename,
            content_type: self.content_type,
            file_size: self.file_size,
            mask_requested: self.mask_requested,
            transform_status: self.transform_status,
            transform_error: self.transform_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the assets table.
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "assets", db.operation = "insert"))]
    pub async fn create(&self, new: NewAsset) -> Result<Asset, AppError> {
        let status = new.initial_status();
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            r#"
            INSERT INTO assets (id, alt, filename, original_filename, content_type, file_size,
                                mask_requested, transform_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.alt)
        .bind(&new.filename)
        .bind(&new.original_filename)
        .bind(&new.content_type)
        .bind(new.file_size)
        .bind(new.mask_requested)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            "SELECT {} FROM assets WHERE id = $1",
            ASSET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AssetRow::to_asset))
    }

    /// Single-statement update, so readers never see a partially applied patch.
    #[tracing::instrument(skip(self, patch), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, patch: AssetPatch) -> Result<Asset, AppError> {
        let (set_error, error) = match patch.transform_error {
            Some(error) => (true, error),
            None => (false, None),
        };

        let row = sqlx::query_as::<Postgres, AssetRow>(&format!(
            r#"
            UPDATE assets SET
                filename = COALESCE($2, filename),
                content_type = COALESCE($3, content_type),
                file_size = COALESCE($4, file_size),
                transform_status = COALESCE($5, transform_status),
                transform_error = CASE WHEN $6 THEN $7 ELSE transform_error END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ASSET_COLUMNS
        ))
        .bind(id)
        .bind(patch.filename)
        .bind(patch.content_type)
        .bind(patch.file_size)
        .bind(patch.transform_status)
        .bind(set_error)
        .bind(error)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AssetRow::to_asset)
            .ok_or_else(|| AppError::NotFound(format!("asset {}", id)))
    }
}
