//! Reference validation for soft cross-entity references
//!
//! The store enforces no foreign keys; every reference an operation cites is
//! checked here before any write happens. Malformed identifiers never reach
//! these functions — UUID parsing at the request boundary rejects them first.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Ensure a category id resolves to an existing category.
pub async fn category_exists(db: &PgPool, id: Uuid) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::InvalidReference(format!(
            "category {} does not exist",
            id
        )))
    }
}

/// Ensure a dealer id resolves to an existing dealer.
pub async fn dealer_exists(db: &PgPool, id: Uuid) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM dealers WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::InvalidReference(format!(
            "dealer {} does not exist",
            id
        )))
    }
}

/// Ensure a media id resolves to an existing media asset.
pub async fn media_exists(db: &PgPool, id: Uuid) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM media_assets WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::InvalidReference(format!(
            "media asset {} does not exist",
            id
        )))
    }
}
