//! Reporting service: dashboard summary and read-only aggregation reports
//!
//! Reports always scan live store state and never touch the cache.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{classify_due, LedgerStatus, StockEntry};

use crate::error::AppResult;

/// Stock level below which a product shows up in the dashboard alerts.
const LOW_STOCK_THRESHOLD: i32 = 5;

/// How far ahead the dashboard looks for upcoming dues.
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// How many recent stock updates / payments the dashboard lists.
const RECENT_LIMIT: usize = 5;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard summary across products and the party ledger
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_stock_quantity: i64,
    pub total_stock_value: Decimal,
    pub low_stock_alerts: LowStockAlerts,
    pub out_of_stock_count: i64,
    pub total_outstanding_dues: Decimal,
    pub upcoming_dues: DueList,
    pub overdue_dues: DueList,
    pub recent_stock_updates: Vec<RecentStockUpdate>,
    pub recent_payments: Vec<RecentPayment>,
}

#[derive(Debug, Serialize)]
pub struct LowStockAlerts {
    pub count: usize,
    pub products: Vec<LowStockProduct>,
}

#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub product_code: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct DueList {
    pub count: usize,
    pub dues: Vec<DueEntry>,
}

#[derive(Debug, Serialize)]
pub struct DueEntry {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentStockUpdate {
    pub id: Uuid,
    pub name: String,
    pub product_code: String,
    pub last_stock_update: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentPayment {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Per-category stock and value report entry
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryReportEntry {
    pub category_id: Uuid,
    pub category_name: String,
    pub stock: i64,
    pub value: Decimal,
}

/// Stock added per calendar month
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MonthlyStockEntry {
    pub month: String,
    pub stock_added: i64,
}

/// Dues bucketed by effective status
#[derive(Debug, Serialize, PartialEq)]
pub struct DuesSummary {
    pub pending: Decimal,
    pub paid: Decimal,
    pub overdue: Decimal,
}

/// Per-category value entry for the stock-value report
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryValueEntry {
    pub category_id: Uuid,
    pub category_name: String,
    pub value: Decimal,
}

/// Stock-value report, flat or grouped by category
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StockValueReport {
    Total { total_stock_value: Decimal },
    ByCategory(Vec<CategoryValueEntry>),
}

/// Query parameters for the stock-value report
#[derive(Debug, Deserialize)]
pub struct StockValueQuery {
    pub group_by_category: Option<bool>,
}

#[derive(Debug, FromRow)]
struct ProductScanRow {
    id: Uuid,
    name: String,
    product_code: String,
    stock: i32,
    dealer_price: Decimal,
    stock_updates: Json<Vec<StockEntry>>,
}

#[derive(Debug, FromRow)]
struct LedgerScanRow {
    id: Uuid,
    dealer_id: Uuid,
    amount: Decimal,
    due_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    status: LedgerStatus,
    paid_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the dashboard summary from a full scan of products and ledger
    pub async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        let now = Utc::now();
        let window_end = now + Duration::days(UPCOMING_WINDOW_DAYS);

        let products = sqlx::query_as::<_, ProductScanRow>(
            "SELECT id, name, product_code, stock, dealer_price, stock_updates FROM products",
        )
        .fetch_all(&self.db)
        .await?;

        let mut total_stock_quantity: i64 = 0;
        let mut total_stock_value = Decimal::ZERO;
        let mut low_stock = Vec::new();
        let mut out_of_stock_count: i64 = 0;
        let mut recent_updates = Vec::new();

        for product in &products {
            total_stock_quantity += product.stock as i64;
            total_stock_value += product.dealer_price * Decimal::from(product.stock);
            if product.stock < LOW_STOCK_THRESHOLD {
                low_stock.push(LowStockProduct {
                    id: product.id,
                    name: product.name.clone(),
                    product_code: product.product_code.clone(),
                    stock: product.stock,
                });
            }
            if product.stock == 0 {
                out_of_stock_count += 1;
            }
            if let Some(last) = product.stock_updates.0.iter().max_by_key(|e| e.date) {
                recent_updates.push(RecentStockUpdate {
                    id: product.id,
                    name: product.name.clone(),
                    product_code: product.product_code.clone(),
                    last_stock_update: last.date,
                    notes: last.notes.clone(),
                });
            }
        }
        recent_updates.sort_by(|a, b| b.last_stock_update.cmp(&a.last_stock_update));
        recent_updates.truncate(RECENT_LIMIT);

        let entries = sqlx::query_as::<_, LedgerScanRow>(
            "SELECT id, dealer_id, amount, due_date, status, paid_at, notes FROM party_ledger",
        )
        .fetch_all(&self.db)
        .await?;

        let mut total_outstanding_dues = Decimal::ZERO;
        let mut upcoming = Vec::new();
        let mut overdue = Vec::new();
        let mut payments = Vec::new();

        for entry in &entries {
            if entry.status != LedgerStatus::Paid {
                total_outstanding_dues += entry.amount;
                if entry.due_date >= now && entry.due_date <= window_end {
                    upcoming.push(due_entry(entry));
                }
                if entry.due_date < now {
                    overdue.push(due_entry(entry));
                }
            } else if let Some(paid_at) = entry.paid_at {
                payments.push(RecentPayment {
                    id: entry.id,
                    dealer_id: entry.dealer_id,
                    amount: entry.amount,
                    paid_at,
                    notes: entry.notes.clone(),
                });
            }
        }
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        payments.truncate(RECENT_LIMIT);

        Ok(DashboardSummary {
            total_products: products.len() as i64,
            total_stock_quantity,
            total_stock_value,
            low_stock_alerts: LowStockAlerts {
                count: low_stock.len(),
                products: low_stock,
            },
            out_of_stock_count,
            total_outstanding_dues,
            upcoming_dues: DueList {
                count: upcoming.len(),
                dues: upcoming,
            },
            overdue_dues: DueList {
                count: overdue.len(),
                dues: overdue,
            },
            recent_stock_updates: recent_updates,
            recent_payments: payments,
        })
    }

    /// Stock quantity and value per category
    pub async fn category_wise(&self) -> AppResult<Vec<CategoryReportEntry>> {
        let entries = sqlx::query_as::<_, CategoryReportEntry>(
            r#"
            SELECT p.category_id,
                   COALESCE(c.name, 'Unknown') AS category_name,
                   COALESCE(SUM(p.stock), 0)::bigint AS stock,
                   COALESCE(SUM(p.dealer_price * p.stock), 0) AS value
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            GROUP BY p.category_id, c.name
            ORDER BY category_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Stock additions folded into calendar months, ascending
    pub async fn monthly_stock(&self) -> AppResult<Vec<MonthlyStockEntry>> {
        let histories = sqlx::query_scalar::<_, Json<Vec<StockEntry>>>(
            "SELECT stock_updates FROM products",
        )
        .fetch_all(&self.db)
        .await?;

        let mut monthly: BTreeMap<String, i64> = BTreeMap::new();
        for history in histories {
            for entry in history.0 {
                let month = entry.date.format("%Y-%m").to_string();
                *monthly.entry(month).or_insert(0) += entry.quantity as i64;
            }
        }

        Ok(monthly
            .into_iter()
            .map(|(month, stock_added)| MonthlyStockEntry { month, stock_added })
            .collect())
    }

    /// Dues bucketed by effective status (stored overdue or past due date)
    pub async fn dues_summary(&self) -> AppResult<DuesSummary> {
        let now = Utc::now();
        let entries = sqlx::query_as::<_, LedgerScanRow>(
            "SELECT id, dealer_id, amount, due_date, status, paid_at, notes FROM party_ledger",
        )
        .fetch_all(&self.db)
        .await?;

        let mut summary = DuesSummary {
            pending: Decimal::ZERO,
            paid: Decimal::ZERO,
            overdue: Decimal::ZERO,
        };
        for entry in entries {
            match classify_due(entry.status, entry.due_date, now) {
                LedgerStatus::Paid => summary.paid += entry.amount,
                LedgerStatus::Overdue => summary.overdue += entry.amount,
                LedgerStatus::Pending => summary.pending += entry.amount,
            }
        }

        Ok(summary)
    }

    /// Total stock value, optionally grouped by category
    pub async fn stock_value(&self, group_by_category: bool) -> AppResult<StockValueReport> {
        if group_by_category {
            let entries = sqlx::query_as::<_, CategoryValueEntry>(
                r#"
                SELECT p.category_id,
                       COALESCE(c.name, 'Unknown') AS category_name,
                       COALESCE(SUM(p.dealer_price * p.stock), 0) AS value
                FROM products p
                LEFT JOIN categories c ON c.id = p.category_id
                GROUP BY p.category_id, c.name
                ORDER BY category_name
                "#,
            )
            .fetch_all(&self.db)
            .await?;
            Ok(StockValueReport::ByCategory(entries))
        } else {
            let total = sqlx::query_scalar::<_, Decimal>(
                "SELECT COALESCE(SUM(dealer_price * stock), 0) FROM products",
            )
            .fetch_one(&self.db)
            .await?;
            Ok(StockValueReport::Total {
                total_stock_value: total,
            })
        }
    }
}

fn due_entry(entry: &LedgerScanRow) -> DueEntry {
    DueEntry {
        id: entry.id,
        dealer_id: entry.dealer_id,
        amount: entry.amount,
        due_date: entry.due_date,
        notes: entry.notes.clone(),
    }
}
