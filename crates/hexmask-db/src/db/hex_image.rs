use chrono::{DateTime, Utc};
use hexmask_core::models::{HexImage, NewHexImage, TransformStatus};
use hexmask_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row type for the hex_images table.
#[derive(Debug, sqlx::FromRow)]
pub struct HexImageRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub asset_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HexImageRow {
    pub fn to_hex_image(self) -> HexImage {
        HexImage {
            id: self.id,
            title: self.title,
            description: self.description,
            asset_id: self.asset_id,
            transform_status: TransformStatus::None,
            hex_url: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the hex_images table.
#[derive(Clone)]
pub struct HexImageRepository {
    pool: PgPool,
}

impl HexImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a hex image. The unique constraint on `asset_id` surfaces as `Conflict`.
    #[tracing::instrument(skip(self, new), fields(db.table = "hex_images", db.operation = "insert", asset_id = %new.asset_id))]
    pub async fn create(&self, new: NewHexImage) -> Result<HexImage, AppError> {
        let row = sqlx::query_as::<Postgres, HexImageRow>(
            r#"
            INSERT INTO hex_images (id, title, description, asset_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, asset_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.asset_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_hex_image())
    }

    #[tracing::instrument(skip(self), fields(db.table = "hex_images", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<HexImage>, AppError> {
        let row = sqlx::query_as::<Postgres, HexImageRow>(
            "SELECT id, title, description, asset_id, created_at, updated_at FROM hex_images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HexImageRow::to_hex_image))
    }

    #[tracing::instrument(skip(self), fields(db.table = "hex_images", db.operation = "select"))]
    pub async fn find_by_asset(&self, asset_id: Uuid) -> Result<Option<HexImage>, AppError> {
        let row = sqlx::query_as::<Postgres, HexImageRow>(
            "SELECT id, title, description, asset_id, created_at, updated_at FROM hex_images WHERE asset_id = $1",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HexImageRow::to_hex_image))
    }

    #[tracing::instrument(skip(self), fields(db.table = "hex_images", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<HexImage>, AppError> {
        let rows = sqlx::query_as::<Postgres, HexImageRow>(
            "SELECT id, title, description, asset_id, created_at, updated_at FROM hex_images ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HexImageRow::to_hex_image).collect())
    }
}
