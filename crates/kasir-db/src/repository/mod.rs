//! # Repository Module
//!
//! Persistence contracts for categories, products and transactions, and
//! their SQLite implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service                                                               │
//! │       │  Arc<dyn ProductRepository>                                    │
//! │       ▼                                                                 │
//! │  ProductRepository (trait)                                             │
//! │  ├── find_all / find_by_id                                             │
//! │  ├── find_by_name_and_active_status                                    │
//! │  ├── insert / update_by_id (version checked) / delete_by_id (soft)     │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                     │
//! │       ▼                          ▼                                     │
//! │  SqliteProductRepository    MemoryProductRepository                    │
//! │  (this module, sqlx)        (crate::memory, RwLock)                    │
//! │                                                                         │
//! │  Repositories persist and look up. Business rules live in services.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Contract
//! - Missing or soft-deleted rows → [`DbError::NotFound`]
//! - Stale `expected_version` → [`DbError::VersionConflict`]
//! - Stock shortfall at commit → [`DbError::StockUnavailable`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use kasir_core::entity::{
    CategoryEntity, CategoryUpdate, ProductEntity, ProductUpdate, ReportStats, SalesRanking,
    TransactionDetailEntity, TransactionEntity,
};
use kasir_core::DateRange;

use crate::error::{DbError, DbResult};
use crate::memory::MemoryStore;
use crate::pool::Database;

pub mod category;
pub mod product;
pub mod transaction;

pub use category::SqliteCategoryRepository;
pub use product::SqliteProductRepository;
pub use transaction::SqliteTransactionRepository;

// =============================================================================
// Contracts
// =============================================================================

/// Category persistence.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every non-deleted category, oldest first.
    async fn find_all(&self) -> DbResult<Vec<CategoryEntity>>;

    /// A non-deleted category by ID.
    async fn find_by_id(&self, id: Uuid) -> DbResult<CategoryEntity>;

    /// A non-deleted category by name, compared case-insensitively.
    async fn find_by_name(&self, name: &str) -> DbResult<CategoryEntity>;

    /// Stores a new category and returns it as stored.
    async fn insert(&self, category: CategoryEntity) -> DbResult<CategoryEntity>;

    /// Applies `update` if the stored version still equals
    /// `update.expected_version`. The stored version is incremented.
    async fn update_by_id(&self, update: CategoryUpdate) -> DbResult<CategoryEntity>;

    /// Soft-deletes (SQLite) or removes (in-memory) a category.
    async fn delete_by_id(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> DbResult<()>;
}

/// Product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every non-deleted product, oldest first.
    async fn find_all(&self) -> DbResult<Vec<ProductEntity>>;

    /// A non-deleted product by ID.
    async fn find_by_id(&self, id: Uuid) -> DbResult<ProductEntity>;

    /// Products whose name contains `name` (case-insensitive) and whose
    /// active state equals `active`. `None` disables that filter.
    async fn find_by_name_and_active_status(
        &self,
        name: Option<&str>,
        active: Option<bool>,
    ) -> DbResult<Vec<ProductEntity>>;

    /// Stores a new product and returns it with its category name resolved.
    async fn insert(&self, product: ProductEntity) -> DbResult<ProductEntity>;

    /// Version-checked update; see [`CategoryRepository::update_by_id`].
    async fn update_by_id(&self, update: ProductUpdate) -> DbResult<ProductEntity>;

    /// Soft-deletes (SQLite) or removes (in-memory) a product.
    async fn delete_by_id(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> DbResult<()>;
}

/// Transaction persistence and sales aggregation.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists the header, every detail line, and one stock decrement per
    /// line as a single all-or-nothing unit.
    async fn create_transaction(
        &self,
        header: &TransactionEntity,
        details: &[TransactionDetailEntity],
    ) -> DbResult<()>;

    /// Revenue, count and top-five rankings for transactions in `range`.
    async fn get_report_stats(&self, range: &DateRange) -> DbResult<ReportStats>;

    /// Category with the most units sold in `range`.
    async fn get_most_popular_category(&self, range: &DateRange) -> DbResult<SalesRanking>;

    /// Product with the most units sold in `range`.
    async fn get_most_popular_product(&self, range: &DateRange) -> DbResult<SalesRanking>;
}

// =============================================================================
// Backend Bundle
// =============================================================================

/// One handle per contract, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl Repositories {
    /// Repositories over a SQLite database.
    pub fn sqlite(db: &Database) -> Self {
        Repositories {
            categories: Arc::new(db.categories()),
            products: Arc::new(db.products()),
            transactions: Arc::new(db.transactions()),
        }
    }

    /// Repositories over a fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Repositories {
            categories: Arc::new(store.categories()),
            products: Arc::new(store.products()),
            transactions: Arc::new(store.transactions()),
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Parses a stored UUID column.
pub(crate) fn parse_uuid(raw: &str) -> DbResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DbError::CorruptRow(format!("invalid id '{}': {}", raw, e)))
}

/// Parses an optional stored UUID column.
pub(crate) fn parse_optional_uuid(raw: Option<&str>) -> DbResult<Option<Uuid>> {
    raw.map(parse_uuid).transpose()
}

/// Orders totals by quantity (desc), then name (asc), keeping `limit`.
pub(crate) fn rank_sales(totals: HashMap<String, i64>, limit: usize) -> Vec<SalesRanking> {
    let mut ranked: Vec<SalesRanking> = totals
        .into_iter()
        .map(|(name, total_sold_qty)| SalesRanking {
            name,
            total_sold_qty,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_sold_qty
            .cmp(&a.total_sold_qty)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Sums `quantity` per product across `details`.
pub(crate) fn requested_per_product(details: &[TransactionDetailEntity]) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for detail in details {
        if let Some(id) = detail.product_id {
            *totals.entry(id).or_insert(0) += detail.quantity;
        }
    }
    totals
}

/// Not-found error for an empty ranking.
pub(crate) fn no_sales(range: &DateRange) -> DbError {
    DbError::not_found(
        "Sales",
        format!("{} .. {}", range.start.to_rfc3339(), range.end.to_rfc3339()),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_sales_orders_and_truncates() {
        let totals = HashMap::from([
            ("Teh".to_string(), 4),
            ("Kopi".to_string(), 9),
            ("Air".to_string(), 4),
            ("Roti".to_string(), 1),
        ]);

        let ranked = rank_sales(totals, 3);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Kopi", "Air", "Teh"]);
        assert_eq!(ranked[0].total_sold_qty, 9);
    }

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        let id = Uuid::now_v7();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_uuid("nope"), Err(DbError::CorruptRow(_))));
        assert_eq!(parse_optional_uuid(None).unwrap(), None);
    }
}
