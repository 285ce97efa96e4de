//! Dealer management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::{
    ident::{self, CODE_WIDTH, DEALER_CODE_PREFIX},
    DealerStatus, MediaRef,
};

use crate::cache::CacheLayer;
use crate::error::{AppError, AppResult};
use crate::services::{pagination, refs, resolve_media_ref, resolve_media_urls};

const LIST_CACHE_KEY: &str = "dealers:list";

fn cache_key(slug: &str) -> String {
    format!("dealer:{slug}")
}

/// Dealer service for managing supplier records
#[derive(Clone)]
pub struct DealerService {
    db: PgPool,
    cache: CacheLayer,
}

/// Dealer record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dealer {
    pub id: Uuid,
    pub dealer_code: String,
    pub company_name: String,
    pub slug: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub image_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub status: DealerStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dealer with its media reference resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerResponse {
    #[serde(flatten)]
    pub dealer: Dealer,
    pub image: Option<MediaRef>,
}

/// Input for creating a dealer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealerInput {
    #[validate(length(min = 1, max = 100))]
    pub company_name: String,
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 15))]
    pub gst_number: Option<String>,
    pub image_id: Option<Uuid>,
    pub status: Option<DealerStatus>,
    pub notes: Option<String>,
}

/// Input for updating a dealer; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDealerInput {
    #[validate(length(min = 1, max = 100))]
    pub company_name: Option<String>,
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 15))]
    pub gst_number: Option<String>,
    pub image_id: Option<Uuid>,
    pub status: Option<DealerStatus>,
    pub notes: Option<String>,
}

/// Query parameters for listing dealers
#[derive(Debug, Deserialize)]
pub struct ListDealersQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<DealerStatus>,
    pub search: Option<String>,
}

const SELECT_DEALER: &str = r#"
    SELECT id, dealer_code, company_name, slug, contact_person, phone, email,
           address, gst_number, image_id, status, notes, created_at, updated_at
    FROM dealers
"#;

impl DealerService {
    /// Create a new DealerService instance
    pub fn new(db: PgPool, cache: CacheLayer) -> Self {
        Self { db, cache }
    }

    /// Create a dealer, assigning the next dealer code and a unique slug
    pub async fn create_dealer(&self, input: CreateDealerInput) -> AppResult<DealerResponse> {
        input.validate()?;

        if let Some(image_id) = input.image_id {
            refs::media_exists(&self.db, image_id).await?;
        }

        let highest = sqlx::query_scalar::<_, String>(
            "SELECT dealer_code FROM dealers ORDER BY dealer_code DESC LIMIT 1",
        )
        .fetch_optional(&self.db)
        .await?;
        let dealer_code =
            ident::next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, highest.as_deref())?;

        let slug = self.unique_slug(&input.company_name, None).await?;
        let status = input.status.unwrap_or_default();

        let dealer = sqlx::query_as::<_, Dealer>(
            r#"
            INSERT INTO dealers (
                dealer_code, company_name, slug, contact_person, phone, email,
                address, gst_number, image_id, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, dealer_code, company_name, slug, contact_person, phone, email,
                      address, gst_number, image_id, status, notes, created_at, updated_at
            "#,
        )
        .bind(&dealer_code)
        .bind(&input.company_name)
        .bind(&slug)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gst_number)
        .bind(input.image_id)
        .bind(status.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate([LIST_CACHE_KEY]);
        self.with_image(dealer).await
    }

    /// Get a dealer by slug (read-through cached)
    pub async fn get_dealer(&self, slug: &str) -> AppResult<DealerResponse> {
        let key = cache_key(slug);
        if let Some(cached) = self.cache.fetch::<DealerResponse>(&key) {
            return Ok(cached);
        }

        let dealer = sqlx::query_as::<_, Dealer>(&format!("{SELECT_DEALER} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        let response = self.with_image(dealer).await?;
        self.cache.put(&key, &response);
        Ok(response)
    }

    /// List dealers with optional status filter and free-text search
    pub async fn list_dealers(&self, query: ListDealersQuery) -> AppResult<Vec<DealerResponse>> {
        let (skip, limit) = pagination(query.skip, query.limit, 10)?;

        let dealers = sqlx::query_as::<_, Dealer>(&format!(
            r#"
            {SELECT_DEALER}
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR company_name ILIKE '%' || $2 || '%'
                   OR contact_person ILIKE '%' || $2 || '%'
                   OR dealer_code ILIKE '%' || $2 || '%'
                   OR phone ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR slug ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(query.status.map(|s| s.as_str().to_string()))
        .bind(&query.search)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = dealers.iter().filter_map(|d| d.image_id).collect();
        let urls = resolve_media_urls(&self.db, &ids).await?;

        Ok(dealers
            .into_iter()
            .map(|dealer| {
                let image = dealer.image_id.and_then(|id| {
                    urls.get(&id).map(|url| MediaRef {
                        image_id: id,
                        image_url: url.clone(),
                    })
                });
                DealerResponse { dealer, image }
            })
            .collect())
    }

    /// Update a dealer; renaming re-derives the slug
    pub async fn update_dealer(
        &self,
        slug: &str,
        input: UpdateDealerInput,
    ) -> AppResult<DealerResponse> {
        input.validate()?;

        let existing = sqlx::query_as::<_, Dealer>(&format!("{SELECT_DEALER} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        if let Some(image_id) = input.image_id {
            refs::media_exists(&self.db, image_id).await?;
        }

        let new_slug = match &input.company_name {
            Some(name) => self.unique_slug(name, Some(existing.id)).await?,
            None => existing.slug.clone(),
        };
        let company_name = input.company_name.unwrap_or(existing.company_name);
        let contact_person = input.contact_person.or(existing.contact_person);
        let phone = input.phone.unwrap_or(existing.phone);
        let email = input.email.or(existing.email);
        let address = input.address.or(existing.address);
        let gst_number = input.gst_number.or(existing.gst_number);
        let image_id = input.image_id.or(existing.image_id);
        let status = input.status.unwrap_or(existing.status);
        let notes = input.notes.or(existing.notes);

        let updated = sqlx::query_as::<_, Dealer>(
            r#"
            UPDATE dealers
            SET company_name = $1, slug = $2, contact_person = $3, phone = $4, email = $5,
                address = $6, gst_number = $7, image_id = $8, status = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING id, dealer_code, company_name, slug, contact_person, phone, email,
                      address, gst_number, image_id, status, notes, created_at, updated_at
            "#,
        )
        .bind(&company_name)
        .bind(&new_slug)
        .bind(&contact_person)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(&gst_number)
        .bind(image_id)
        .bind(status.as_str())
        .bind(&notes)
        .bind(existing.id)
        .fetch_one(&self.db)
        .await?;

        let old_key = cache_key(slug);
        self.cache.invalidate([old_key.as_str(), LIST_CACHE_KEY]);
        if updated.slug != slug {
            let new_key = cache_key(&updated.slug);
            self.cache.invalidate([new_key.as_str()]);
        }
        self.with_image(updated).await
    }

    /// Delete a dealer by slug. The linked media asset, if any, is left
    /// untouched in the media center.
    pub async fn delete_dealer(&self, slug: &str) -> AppResult<()> {
        let deleted =
            sqlx::query_scalar::<_, Uuid>("DELETE FROM dealers WHERE slug = $1 RETURNING id")
                .bind(slug)
                .fetch_optional(&self.db)
                .await?;

        if deleted.is_none() {
            return Err(AppError::NotFound("Dealer".to_string()));
        }

        let key = cache_key(slug);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(())
    }

    async fn with_image(&self, dealer: Dealer) -> AppResult<DealerResponse> {
        let image = resolve_media_ref(&self.db, dealer.image_id).await?;
        Ok(DealerResponse { dealer, image })
    }

    /// Probe for a free slug: base, then base-1, base-2, ...
    async fn unique_slug(&self, name: &str, exclude: Option<Uuid>) -> AppResult<String> {
        let base = ident::slugify(name);
        let mut candidate = base.clone();
        let mut n = 1u32;
        while self.slug_taken(&candidate, exclude).await? {
            candidate = ident::numbered_slug(&base, n);
            n += 1;
        }
        Ok(candidate)
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dealers WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }
}
