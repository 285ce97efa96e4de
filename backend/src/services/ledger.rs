//! Party ledger service for tracking dealer dues and payments

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validation::validate_amount, LedgerStatus};

use crate::cache::CacheLayer;
use crate::error::{AppError, AppResult};
use crate::services::{pagination, refs};

const LIST_CACHE_KEY: &str = "ledgers:list";

fn cache_key(id: Uuid) -> String {
    format!("ledger:{id}")
}

/// Ledger service for managing party ledger entries
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
    cache: CacheLayer,
}

/// Party ledger entry record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: LedgerStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a ledger entry
#[derive(Debug, Deserialize)]
pub struct CreateLedgerInput {
    pub dealer_id: Uuid,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub status: Option<LedgerStatus>,
    pub notes: Option<String>,
}

/// Input for updating a ledger entry; absent fields are left unchanged.
/// Supplying `paid_at` marks the entry paid regardless of `status`.
#[derive(Debug, Deserialize)]
pub struct UpdateLedgerInput {
    pub amount: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<LedgerStatus>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl UpdateLedgerInput {
    fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.paid_at.is_none()
    }
}

/// Query parameters for listing ledger entries
#[derive(Debug, Deserialize)]
pub struct ListLedgersQuery {
    pub dealer_id: Option<Uuid>,
    pub status: Option<LedgerStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

const SELECT_LEDGER: &str = r#"
    SELECT id, dealer_id, amount, due_date, status, paid_at, notes, created_at
    FROM party_ledger
"#;

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool, cache: CacheLayer) -> Self {
        Self { db, cache }
    }

    /// Create a ledger entry for a dealer
    pub async fn create_entry(&self, input: CreateLedgerInput) -> AppResult<LedgerEntry> {
        validate_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;
        refs::dealer_exists(&self.db, input.dealer_id).await?;

        let status = input.status.unwrap_or_default();

        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO party_ledger (dealer_id, amount, due_date, status, paid_at, notes)
            VALUES ($1, $2, $3, $4, NULL, $5)
            RETURNING id, dealer_id, amount, due_date, status, paid_at, notes, created_at
            "#,
        )
        .bind(input.dealer_id)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(status.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        self.cache.invalidate([LIST_CACHE_KEY]);
        Ok(entry)
    }

    /// Get a ledger entry by id (read-through cached)
    pub async fn get_entry(&self, id: Uuid) -> AppResult<LedgerEntry> {
        let key = cache_key(id);
        if let Some(cached) = self.cache.fetch::<LedgerEntry>(&key) {
            return Ok(cached);
        }

        let entry = sqlx::query_as::<_, LedgerEntry>(&format!("{SELECT_LEDGER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry".to_string()))?;

        self.cache.put(&key, &entry);
        Ok(entry)
    }

    /// List ledger entries with optional dealer, status and due-date filters
    pub async fn list_entries(&self, query: ListLedgersQuery) -> AppResult<Vec<LedgerEntry>> {
        let (skip, limit) = pagination(query.skip, query.limit, 20)?;

        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            r#"
            {SELECT_LEDGER}
            WHERE ($1::uuid IS NULL OR dealer_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR due_date >= $3)
              AND ($4::timestamptz IS NULL OR due_date <= $4)
            ORDER BY created_at DESC
            OFFSET $5 LIMIT $6
            "#
        ))
        .bind(query.dealer_id)
        .bind(query.status.map(|s| s.as_str().to_string()))
        .bind(query.date_from)
        .bind(query.date_to)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Update a ledger entry. Setting `paid_at` forces the status to paid.
    pub async fn update_entry(&self, id: Uuid, input: UpdateLedgerInput) -> AppResult<LedgerEntry> {
        if input.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }
        if let Some(amount) = input.amount {
            validate_amount(amount).map_err(|msg| AppError::Validation {
                field: "amount".to_string(),
                message: msg.to_string(),
            })?;
        }

        let existing = sqlx::query_as::<_, LedgerEntry>(&format!("{SELECT_LEDGER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry".to_string()))?;

        let amount = input.amount.unwrap_or(existing.amount);
        let due_date = input.due_date.unwrap_or(existing.due_date);
        let notes = input.notes.or(existing.notes);
        let paid_at = input.paid_at.or(existing.paid_at);
        // Recording a payment wins over any explicitly supplied status.
        let status = if input.paid_at.is_some() {
            LedgerStatus::Paid
        } else {
            input.status.unwrap_or(existing.status)
        };

        let updated = sqlx::query_as::<_, LedgerEntry>(
            r#"
            UPDATE party_ledger
            SET amount = $1, due_date = $2, status = $3, paid_at = $4, notes = $5
            WHERE id = $6
            RETURNING id, dealer_id, amount, due_date, status, paid_at, notes, created_at
            "#,
        )
        .bind(amount)
        .bind(due_date)
        .bind(status.as_str())
        .bind(paid_at)
        .bind(&notes)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        let key = cache_key(id);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(updated)
    }

    /// Delete a ledger entry by id
    pub async fn delete_entry(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM party_ledger WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ledger entry".to_string()));
        }

        let key = cache_key(id);
        self.cache.invalidate([key.as_str(), LIST_CACHE_KEY]);
        Ok(())
    }
}
