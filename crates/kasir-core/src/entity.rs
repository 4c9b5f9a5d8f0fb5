//! # Entities
//!
//! Internal records as the persistence layer stores them.
//!
//! ## Entity vs Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Entity (this module)              Model (model.rs)                    │
//! │   ────────────────────              ─────────────────                   │
//! │   id: Uuid                    ──►   id: String (base-62)               │
//! │   created_by / updated_by           (not exposed)                      │
//! │   category_id: Option<Uuid>   ──►   category: Option<String> (name)    │
//! │   price: Price                ──►   price: Price                       │
//! │                                                                         │
//! │   Repositories speak entities, clients speak models.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Transaction details copy the product name, category and unit price at
//! sale time. Renaming or deleting a product later never changes history.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::money::Price;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Optimistic-lock counter, starts at 1.
    pub version: i64,
}

impl CategoryEntity {
    /// Builds a brand-new category stamped with `actor` at `now`.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Self {
        CategoryEntity {
            id,
            name: name.into(),
            description: description.into(),
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: actor.to_string(),
            deleted_at: None,
            version: 1,
        }
    }
}

/// The fields a category update may change, plus the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    /// Version the client read. The update only applies if it still matches.
    pub expected_version: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEntity {
    pub id: Uuid,
    pub name: String,
    pub price: Price,
    /// Units on hand. Never negative.
    pub stock: i64,
    pub category_id: Option<Uuid>,
    /// Resolved from the category row on read; not stored on the product.
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl ProductEntity {
    /// A product is active until it is soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// The fields a product update may change, plus the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub id: Uuid,
    pub name: String,
    pub price: Price,
    pub stock: i64,
    pub category_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub expected_version: i64,
}

// =============================================================================
// Transaction
// =============================================================================

/// Transaction header. Created once, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEntity {
    pub id: Uuid,
    /// Sum of line quantities.
    pub total_items: i64,
    /// Sum of line totals.
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// One product line of a transaction, with its snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetailEntity {
    pub id: Uuid,
    pub transaction_id: Uuid,
    /// Nullable: the product may be deleted later.
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    /// Unit price at sale time.
    pub price: Price,
    pub quantity: i64,
    /// `price × quantity`, fixed at sale time.
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

// =============================================================================
// Reports
// =============================================================================

/// Units sold for one product or category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRanking {
    pub name: String,
    pub total_sold_qty: i64,
}

/// Raw aggregates for a report window, before pricing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Sum of transaction totals, in minor units.
    pub total_revenue: i64,
    pub total_transactions: i64,
    pub top_items: Vec<SalesRanking>,
    pub top_categories: Vec<SalesRanking>,
}

// =============================================================================
// Unit Tests
// =============================================================================
