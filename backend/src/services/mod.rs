//! Business logic services for the Inventory Management System

pub mod category;
pub mod dealer;
pub mod ledger;
pub mod media;
pub mod product;
pub mod refs;
pub mod reporting;

pub use category::CategoryService;
pub use dealer::DealerService;
pub use ledger::LedgerService;
pub use media::MediaService;
pub use product::ProductService;
pub use reporting::ReportingService;

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use shared::MediaRef;

use crate::error::{AppError, AppResult};

/// Validate and default skip/limit pagination parameters.
pub(crate) fn pagination(
    skip: Option<i64>,
    limit: Option<i64>,
    default_limit: i64,
) -> AppResult<(i64, i64)> {
    let skip = skip.unwrap_or(0);
    if skip < 0 {
        return Err(AppError::Validation {
            field: "skip".to_string(),
            message: "skip must be non-negative".to_string(),
        });
    }

    let limit = limit.unwrap_or(default_limit);
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation {
            field: "limit".to_string(),
            message: "limit must be between 1 and 100".to_string(),
        });
    }

    Ok((skip, limit))
}

/// Resolve an optional media reference to its URL, if the asset still exists.
pub(crate) async fn resolve_media_ref(
    db: &PgPool,
    image_id: Option<Uuid>,
) -> AppResult<Option<MediaRef>> {
    let Some(image_id) = image_id else {
        return Ok(None);
    };

    let url = sqlx::query_scalar::<_, String>("SELECT url FROM media_assets WHERE id = $1")
        .bind(image_id)
        .fetch_optional(db)
        .await?;

    Ok(url.map(|image_url| MediaRef {
        image_id,
        image_url,
    }))
}

/// Resolve a batch of media ids to URLs in a single query.
pub(crate) async fn resolve_media_urls(
    db: &PgPool,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, url FROM media_assets WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::pagination;

    #[test]
    fn pagination_defaults() {
        assert_eq!(pagination(None, None, 10).unwrap(), (0, 10));
        assert_eq!(pagination(None, None, 20).unwrap(), (0, 20));
        assert_eq!(pagination(Some(40), Some(100), 10).unwrap(), (40, 100));
    }

    #[test]
    fn pagination_rejects_out_of_range() {
        assert!(pagination(Some(-1), None, 10).is_err());
        assert!(pagination(None, Some(0), 10).is_err());
        assert!(pagination(None, Some(101), 10).is_err());
    }
}
