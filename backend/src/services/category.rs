//! Category management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::{ident, CategoryStatus};

use crate::cache::CacheLayer;
use crate::error::{AppError, AppResult};
use crate::services::pagination;

const LIST_CACHE_KEY: &str = "categories:list";

fn cache_key(slug: &str) -> String {
    format!("category:{slug}")
}

/// Category service for managing product categories
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
    cache: CacheLayer,
}

/// Category record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CategoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<CategoryStatus>,
}

/// Input for updating a category; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CategoryStatus>,
}

/// Query parameters for listing categories
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<CategoryStatus>,
    pub search: Option<String>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool, cache: CacheLayer) -> Self {
        Self { db, cache }
    }

    /// Create a category with a unique slug derived from its name
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let slug = self.unique_slug(&input.name, None).await?;
        let status = input.status.unwrap_or_default();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, description, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&slug)
        .bind(&input.description)
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate([LIST_CACHE_KEY]);
        Ok(category)
    }

    /// Get a category by slug (read-through cached)
    pub async fn get_category(&self, slug: &str) -> AppResult<Category> {
        let key = cache_key(slug);
        if let Some(cached) = self.cache.fetch::<Category>(&key) {
            return Ok(cached);
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, status, created_at, updated_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        self.cache.put(&key, &category);
        Ok(category)
    }

    /// List categories with optional status filter and name search
    pub async fn list_categories(&self, query: ListCategoriesQuery) -> AppResult<Vec<Category>> {
        let (skip, limit) = pagination(query.skip, query.limit, 10)?;

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, status, created_at, updated_at
            FROM categories
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(query.status.map(|s| s.as_str().to_string()))
        .bind(&query.search)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Update a category; renaming re-derives the slug
    pub async fn update_category(
        &self,
        slug: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;

        let existing = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, status, created_at, updated_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let new_slug = match &input.name {
            Some(name) => self.unique_slug(name, Some(existing.id)).await?,
            None => existing.slug.clone(),
        };
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);

        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, description = $3, status = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, slug, description, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&new_slug)
        .bind(&description)
        .bind(status.as_str())
        .bind(existing.id)
        .fetch_one(&self.db)
        .await?;

        let old_key = cache_key(slug);
        self.cache.invalidate([old_key.as_str(), LIST_CACHE_KEY]);
        if updated.slug != slug {
            let new_key = cache_key(&updated.slug);
            self.cache.invalidate([new_key.as_str()]);
        }
        Ok(updated)
    }

    /// Delete a category by slug
    pub async fn delete_category(&self, slug: &str) -> AppResult<()> {
        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM categories WHERE slug = $1 RETURNING id")
            .bind(slug)
            .fetch_optional(&self.db)
            .await?;

        if deleted.is_none() {
            return Err(AppError::NotFound("Category".to_string()));
        }

        let key = cache_key(slug);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(())
    }

    /// Probe for a free slug: base, then base-1, base-2, ...
    ///
    /// Sequential check-then-act; two concurrent creators with the same name
    /// can both observe a candidate as free. The store stays authoritative,
    /// the cache is never consulted here.
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
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }
}
