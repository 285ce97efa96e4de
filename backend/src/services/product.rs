//! Product management service
//!
//! Products carry an append-only stock history; the general update path can
//! never touch stock levels. Stock only moves through [`ProductService::add_stock`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::{
    ident::{self, CODE_WIDTH, PRODUCT_CODE_PREFIX},
    validation::validate_amount,
    MediaRef, ProductStatus, StockEntry,
};

use crate::cache::CacheLayer;
use crate::error::{AppError, AppResult};
use crate::services::{pagination, refs, resolve_media_ref, resolve_media_urls};

const LIST_CACHE_KEY: &str = "products:list";

fn cache_key(slug: &str) -> String {
    format!("product:{slug}")
}

/// Product service for managing the inventory catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
    cache: CacheLayer,
}

/// Product record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub dealer_id: Uuid,
    pub product_code: String,
    pub model_number: String,
    pub name: String,
    pub slug: String,
    pub dealer_price: Decimal,
    pub stock: i32,
    pub total_stock_received: i32,
    #[sqlx(try_from = "String")]
    pub status: ProductStatus,
    pub description: Option<String>,
    pub image_id: Option<Uuid>,
    pub stock_updates: Json<Vec<StockEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its media reference resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<MediaRef>,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    pub category_id: Uuid,
    pub dealer_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub model_number: String,
    pub dealer_price: Decimal,
    pub description: Option<String>,
    pub image_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub initial_stock: i32,
    pub stock_notes: Option<String>,
}

/// Input for updating a product; absent fields are left unchanged.
/// Stock is deliberately absent — use the stock-addition operation.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub dealer_id: Option<Uuid>,
    pub dealer_price: Option<Decimal>,
    pub description: Option<String>,
    pub image_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

impl UpdateProductInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.dealer_id.is_none()
            && self.dealer_price.is_none()
            && self.description.is_none()
            && self.image_id.is_none()
            && self.status.is_none()
    }
}

/// Input for the stock-addition operation
#[derive(Debug, Deserialize, Validate)]
pub struct AddStockInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ProductStatus>,
    pub category_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub search: Option<String>,
    pub model_number: Option<String>,
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, category_id, dealer_id, product_code, model_number, name, slug,
           dealer_price, stock, total_stock_received, status, description,
           image_id, stock_updates, created_at, updated_at
    FROM products
"#;

const RETURNING_PRODUCT: &str = r#"
    RETURNING id, category_id, dealer_id, product_code, model_number, name, slug,
              dealer_price, stock, total_stock_received, status, description,
              image_id, stock_updates, created_at, updated_at
"#;

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool, cache: CacheLayer) -> Self {
        Self { db, cache }
    }

    /// Create a product with initial stock.
    ///
    /// All references are validated before anything is written; a positive
    /// initial stock seeds the history with a single entry.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductResponse> {
        input.validate()?;
        validate_amount(input.dealer_price).map_err(|msg| AppError::Validation {
            field: "dealer_price".to_string(),
            message: msg.to_string(),
        })?;

        refs::category_exists(&self.db, input.category_id).await?;
        refs::dealer_exists(&self.db, input.dealer_id).await?;
        if let Some(image_id) = input.image_id {
            refs::media_exists(&self.db, image_id).await?;
        }

        let model_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE model_number = $1)",
        )
        .bind(&input.model_number)
        .fetch_one(&self.db)
        .await?;
        if model_taken {
            return Err(AppError::DuplicateEntry("model_number".to_string()));
        }

        let highest = sqlx::query_scalar::<_, String>(
            "SELECT product_code FROM products ORDER BY product_code DESC LIMIT 1",
        )
        .fetch_optional(&self.db)
        .await?;
        let product_code =
            ident::next_sequential_code(PRODUCT_CODE_PREFIX, CODE_WIDTH, highest.as_deref())?;

        let slug = self.unique_slug(&input.name, None).await?;
        let status = ProductStatus::from_stock(input.initial_stock);
        let history: Vec<StockEntry> = if input.initial_stock > 0 {
            vec![StockEntry {
                quantity: input.initial_stock,
                date: Utc::now(),
                notes: input.stock_notes.clone(),
            }]
        } else {
            Vec::new()
        };

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                category_id, dealer_id, product_code, model_number, name, slug,
                dealer_price, stock, total_stock_received, status, description,
                image_id, stock_updates
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            {RETURNING_PRODUCT}
            "#
        ))
        .bind(input.category_id)
        .bind(input.dealer_id)
        .bind(&product_code)
        .bind(&input.model_number)
        .bind(&input.name)
        .bind(&slug)
        .bind(input.dealer_price)
        .bind(input.initial_stock)
        .bind(input.initial_stock)
        .bind(status.as_str())
        .bind(&input.description)
        .bind(input.image_id)
        .bind(Json(history))
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate([LIST_CACHE_KEY]);
        self.with_images(product).await
    }

    /// Get a product by slug (read-through cached)
    pub async fn get_product(&self, slug: &str) -> AppResult<ProductResponse> {
        let key = cache_key(slug);
        if let Some(cached) = self.cache.fetch::<ProductResponse>(&key) {
            return Ok(cached);
        }

        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let response = self.with_images(product).await?;
        self.cache.put(&key, &response);
        Ok(response)
    }

    /// List products with optional filters and free-text search
    pub async fn list_products(&self, query: ListProductsQuery) -> AppResult<Vec<ProductResponse>> {
        let (skip, limit) = pagination(query.skip, query.limit, 10)?;

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            {SELECT_PRODUCT}
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::uuid IS NULL OR dealer_id = $3)
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%'
                   OR model_number ILIKE '%' || $4 || '%'
                   OR product_code ILIKE '%' || $4 || '%'
                   OR slug ILIKE '%' || $4 || '%')
              AND ($5::text IS NULL OR model_number = $5)
            ORDER BY created_at DESC
            OFFSET $6 LIMIT $7
            "#
        ))
        .bind(query.status.map(|s| s.as_str().to_string()))
        .bind(query.category_id)
        .bind(query.dealer_id)
        .bind(&query.search)
        .bind(&query.model_number)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = products.iter().filter_map(|p| p.image_id).collect();
        let urls = resolve_media_urls(&self.db, &ids).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let images = product
                    .image_id
                    .and_then(|id| {
                        urls.get(&id).map(|url| MediaRef {
                            image_id: id,
                            image_url: url.clone(),
                        })
                    })
                    .into_iter()
                    .collect();
                ProductResponse { product, images }
            })
            .collect())
    }

    /// Update a product's details by slug (never its stock)
    pub async fn update_product(
        &self,
        slug: &str,
        input: UpdateProductInput,
    ) -> AppResult<ProductResponse> {
        input.validate()?;
        if input.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }
        if let Some(price) = input.dealer_price {
            validate_amount(price).map_err(|msg| AppError::Validation {
                field: "dealer_price".to_string(),
                message: msg.to_string(),
            })?;
        }

        let existing = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if let Some(dealer_id) = input.dealer_id {
            refs::dealer_exists(&self.db, dealer_id).await?;
        }
        if let Some(image_id) = input.image_id {
            refs::media_exists(&self.db, image_id).await?;
        }

        let new_slug = match &input.name {
            Some(name) => self.unique_slug(name, Some(existing.id)).await?,
            None => existing.slug.clone(),
        };
        let name = input.name.unwrap_or(existing.name);
        let dealer_id = input.dealer_id.unwrap_or(existing.dealer_id);
        let dealer_price = input.dealer_price.unwrap_or(existing.dealer_price);
        let description = input.description.or(existing.description);
        let image_id = input.image_id.or(existing.image_id);
        let status = input.status.unwrap_or(existing.status);

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $1, slug = $2, dealer_id = $3, dealer_price = $4,
                description = $5, image_id = $6, status = $7, updated_at = NOW()
            WHERE id = $8
            {RETURNING_PRODUCT}
            "#
        ))
        .bind(&name)
        .bind(&new_slug)
        .bind(dealer_id)
        .bind(dealer_price)
        .bind(&description)
        .bind(image_id)
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
        self.with_images(updated).await
    }

    /// Add stock to a product, appending one history entry and re-deriving
    /// the availability status from the new level.
    pub async fn add_stock(&self, slug: &str, input: AddStockInput) -> AppResult<ProductResponse> {
        input.validate()?;

        let existing = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let new_stock = existing.stock + input.quantity;
        let new_total = existing.total_stock_received + input.quantity;
        let status = ProductStatus::from_stock(new_stock);
        let entry = StockEntry {
            quantity: input.quantity,
            date: Utc::now(),
            notes: input.notes,
        };

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET stock = $1, total_stock_received = $2, status = $3,
                stock_updates = stock_updates || $4::jsonb, updated_at = NOW()
            WHERE id = $5
            {RETURNING_PRODUCT}
            "#
        ))
        .bind(new_stock)
        .bind(new_total)
        .bind(status.as_str())
        .bind(Json(vec![entry]))
        .bind(existing.id)
        .fetch_one(&self.db)
        .await?;

        let key = cache_key(slug);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        self.with_images(updated).await
    }

    /// Delete a product by slug. Refused while any stock remains.
    pub async fn delete_product(&self, slug: &str) -> AppResult<()> {
        let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if stock > 0 {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Cannot delete product with existing stock. Update status to 'discontinued' instead.".to_string(),
            });
        }

        sqlx::query("DELETE FROM products WHERE slug = $1")
            .bind(slug)
            .execute(&self.db)
            .await?;

        let key = cache_key(slug);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(())
    }

    async fn with_images(&self, product: Product) -> AppResult<ProductResponse> {
        let images = resolve_media_ref(&self.db, product.image_id)
            .await?
            .into_iter()
            .collect();
        Ok(ProductResponse { product, images })
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
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }
}
