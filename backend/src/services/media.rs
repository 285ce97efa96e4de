//! Media center service
//!
//! Assets live on an external image host; the database keeps the returned
//! URL and storage handle plus metadata. An asset referenced by any product
//! or dealer cannot be deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::validation::{validate_image_content_type, validate_image_size};

use crate::cache::CacheLayer;
use crate::error::{AppError, AppResult};
use crate::external::MediaHostClient;
use crate::services::pagination;

const LIST_CACHE_KEY: &str = "media:list";

fn cache_key(id: Uuid) -> String {
    format!("media:{id}")
}

/// Media service for managing hosted image assets
#[derive(Clone)]
pub struct MediaService {
    db: PgPool,
    cache: CacheLayer,
    host: Option<MediaHostClient>,
}

/// Media asset record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaAsset {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub storage_handle: String,
    pub file_type: String,
    pub file_size: i64,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// An image payload extracted from a multipart request
#[derive(Debug)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Input for creating a media asset
#[derive(Debug)]
pub struct CreateMediaInput {
    pub filename: String,
    pub upload: MediaUpload,
}

/// Input for updating a media asset; absent fields are left unchanged
#[derive(Debug, Default)]
pub struct UpdateMediaInput {
    pub filename: Option<String>,
    pub is_active: Option<bool>,
    pub upload: Option<MediaUpload>,
}

/// Query parameters for listing media assets
#[derive(Debug, Deserialize)]
pub struct ListMediaQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

const SELECT_MEDIA: &str = r#"
    SELECT id, filename, url, storage_handle, file_type, file_size,
           usage_count, is_active, created_at
    FROM media_assets
"#;

impl MediaService {
    /// Create a new MediaService instance without an upload host
    pub fn new(db: PgPool, cache: CacheLayer) -> Self {
        Self {
            db,
            cache,
            host: None,
        }
    }

    /// Create a new MediaService with a media host client
    pub fn with_host(db: PgPool, cache: CacheLayer, host: MediaHostClient) -> Self {
        Self {
            db,
            cache,
            host: Some(host),
        }
    }

    /// Upload an image and record the asset
    pub async fn create_media(&self, input: CreateMediaInput) -> AppResult<MediaAsset> {
        if input.filename.trim().is_empty() {
            return Err(AppError::Validation {
                field: "filename".to_string(),
                message: "filename must not be empty".to_string(),
            });
        }
        Self::validate_upload(&input.upload)?;

        let host = self.host()?;
        let uploaded = host
            .upload(
                &input.filename,
                &input.upload.content_type,
                input.upload.bytes,
            )
            .await?;

        let asset = sqlx::query_as::<_, MediaAsset>(
            r#"
            INSERT INTO media_assets (filename, url, storage_handle, file_type, file_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, filename, url, storage_handle, file_type, file_size,
                      usage_count, is_active, created_at
            "#,
        )
        .bind(&input.filename)
        .bind(&uploaded.url)
        .bind(&uploaded.handle)
        .bind(&uploaded.file_type)
        .bind(uploaded.file_size)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate([LIST_CACHE_KEY]);
        Ok(asset)
    }

    /// Get a media asset by id (read-through cached)
    pub async fn get_media(&self, id: Uuid) -> AppResult<MediaAsset> {
        let key = cache_key(id);
        if let Some(cached) = self.cache.fetch::<MediaAsset>(&key) {
            return Ok(cached);
        }

        let asset = sqlx::query_as::<_, MediaAsset>(&format!("{SELECT_MEDIA} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Media".to_string()))?;

        self.cache.put(&key, &asset);
        Ok(asset)
    }

    /// List media assets
    pub async fn list_media(&self, query: ListMediaQuery) -> AppResult<Vec<MediaAsset>> {
        let (skip, limit) = pagination(query.skip, query.limit, 10)?;

        let assets = sqlx::query_as::<_, MediaAsset>(&format!(
            "{SELECT_MEDIA} ORDER BY created_at DESC OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(assets)
    }

    /// Update a media asset's metadata and optionally replace its image.
    ///
    /// A replacement is uploaded first; the old hosted asset is then deleted
    /// best-effort (a failure there leaves an orphan on the host, never an
    /// error for the caller).
    pub async fn update_media(&self, id: Uuid, input: UpdateMediaInput) -> AppResult<MediaAsset> {
        if input.filename.is_none() && input.is_active.is_none() && input.upload.is_none() {
            return Err(AppError::ValidationError(
                "No update fields provided".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, MediaAsset>(&format!("{SELECT_MEDIA} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Media".to_string()))?;

        let replacement = match input.upload {
            Some(upload) => {
                Self::validate_upload(&upload)?;
                let host = self.host()?;
                let uploaded = host
                    .upload(&existing.filename, &upload.content_type, upload.bytes)
                    .await?;
                if let Err(err) = host.delete(&existing.storage_handle).await {
                    tracing::warn!(handle = %existing.storage_handle, %err,
                        "failed to delete replaced asset from media host");
                }
                Some(uploaded)
            }
            None => None,
        };

        let filename = input.filename.unwrap_or(existing.filename);
        let is_active = input.is_active.unwrap_or(existing.is_active);
        let (url, handle, file_type, file_size) = match replacement {
            Some(up) => (up.url, up.handle, up.file_type, up.file_size),
            None => (
                existing.url,
                existing.storage_handle,
                existing.file_type,
                existing.file_size,
            ),
        };

        let updated = sqlx::query_as::<_, MediaAsset>(
            r#"
            UPDATE media_assets
            SET filename = $1, url = $2, storage_handle = $3, file_type = $4,
                file_size = $5, is_active = $6
            WHERE id = $7
            RETURNING id, filename, url, storage_handle, file_type, file_size,
                      usage_count, is_active, created_at
            "#,
        )
        .bind(&filename)
        .bind(&url)
        .bind(&handle)
        .bind(&file_type)
        .bind(file_size)
        .bind(is_active)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        let key = cache_key(id);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        self.invalidate_referents(id).await?;
        Ok(updated)
    }

    /// Delete a media asset.
    ///
    /// Refused while any product or dealer references the asset. The hosted
    /// image is deleted first; if the host refuses, the record is kept so no
    /// stored reference ever points at a missing asset.
    pub async fn delete_media(&self, id: Uuid) -> AppResult<()> {
        let existing = sqlx::query_as::<_, MediaAsset>(&format!("{SELECT_MEDIA} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Media".to_string()))?;

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM products WHERE image_id = $1)
                OR EXISTS(SELECT 1 FROM dealers WHERE image_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        if referenced {
            return Err(AppError::Conflict {
                resource: "media".to_string(),
                message:
                    "Cannot delete media: it is used by a product or dealer. Remove the reference before deleting."
                        .to_string(),
            });
        }

        let host = self.host()?;
        host.delete(&existing.storage_handle).await?;

        sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        let key = cache_key(id);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(())
    }

    /// Drop cached entries of every product and dealer that embeds this
    /// asset, so the next keyed read re-resolves the reference.
    async fn invalidate_referents(&self, id: Uuid) -> AppResult<()> {
        let product_slugs =
            sqlx::query_scalar::<_, String>("SELECT slug FROM products WHERE image_id = $1")
                .bind(id)
                .fetch_all(&self.db)
                .await?;
        let dealer_slugs =
            sqlx::query_scalar::<_, String>("SELECT slug FROM dealers WHERE image_id = $1")
                .bind(id)
                .fetch_all(&self.db)
                .await?;

        let mut keys: Vec<String> = Vec::new();
        if !product_slugs.is_empty() {
            keys.push("products:list".to_string());
            keys.extend(product_slugs.into_iter().map(|s| format!("product:{s}")));
        }
        if !dealer_slugs.is_empty() {
            keys.push("dealers:list".to_string());
            keys.extend(dealer_slugs.into_iter().map(|s| format!("dealer:{s}")));
        }
        self.cache.invalidate(keys.iter().map(|k| k.as_str()));
        Ok(())
    }

    fn host(&self) -> AppResult<&MediaHostClient> {
        self.host
            .as_ref()
            .ok_or_else(|| AppError::Configuration("media hosting is not configured".to_string()))
    }

    fn validate_upload(upload: &MediaUpload) -> AppResult<()> {
        validate_image_content_type(&upload.content_type).map_err(|msg| AppError::Validation {
            field: "image".to_string(),
            message: msg.to_string(),
        })?;
        validate_image_size(upload.bytes.len()).map_err(|msg| AppError::Validation {
            field: "image".to_string(),
            message: msg.to_string(),
        })?;
        Ok(())
    }
}
