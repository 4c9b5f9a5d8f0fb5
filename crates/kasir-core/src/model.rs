//! # External Models
//!
//! The JSON shapes clients send and receive, and their conversion from
//! entities.
//!
//! ## Conversion Rules
//! - Every `Uuid` leaves the system base-62 encoded ([`crate::id::encode`])
//! - Audit actors stay internal
//! - `deleted_at` and optional references are omitted when absent
//!
//! TypeScript bindings are generated for every type here (`#[ts(export)]`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{
    CategoryEntity, ProductEntity, SalesRanking, TransactionDetailEntity, TransactionEntity,
};
use crate::id;
use crate::money::Price;

// =============================================================================
// Category
// =============================================================================

/// Category as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    /// Base-62 encoded UUIDv7
    pub id: String,
    pub name: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<&CategoryEntity> for Category {
    fn from(entity: &CategoryEntity) -> Self {
        Category {
            id: id::encode(entity.id),
            name: entity.name.clone(),
            description: entity.description.clone(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
            version: entity.version,
        }
    }
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /api/categories/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Version the client last read.
    #[serde(default)]
    pub version: i64,
}

// =============================================================================
// Product
// =============================================================================

/// Product as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub stocks: i64,
    /// Category name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<&ProductEntity> for Product {
    fn from(entity: &ProductEntity) -> Self {
        Product {
            id: id::encode(entity.id),
            name: entity.name.clone(),
            price: entity.price.clone(),
            stocks: entity.stock,
            category: entity.category_name.clone().filter(|name| !name.is_empty()),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
            version: entity.version,
        }
    }
}

/// Body of `POST /api/products`.
///
/// `price` is in minor units of the configured currency; `category` is a
/// category name (empty for none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub stocks: i64,
    #[serde(default)]
    pub category: String,
}

/// Body of `PUT /api/products/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub stocks: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub version: i64,
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub total_items: i64,
    pub total_price: Price,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Builds the client view from a header and its lines.
    pub fn from_parts(header: &TransactionEntity, details: &[TransactionDetailEntity]) -> Self {
        Transaction {
            id: id::encode(header.id),
            total_items: header.total_items,
            total_price: header.total_price.clone(),
            created_at: header.created_at,
            details: details.iter().map(TransactionDetail::from).collect(),
        }
    }
}

/// One line of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    pub id: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub product_name: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub category_name: String,
    pub price: Price,
    pub quantity: i64,
    pub total_price: Price,
}

impl From<&TransactionDetailEntity> for TransactionDetail {
    fn from(entity: &TransactionDetailEntity) -> Self {
        TransactionDetail {
            id: id::encode(entity.id),
            product_id: entity.product_id.map(id::encode),
            product_name: entity.product_name.clone(),
            category_id: entity.category_id.map(id::encode),
            category_name: entity.category_name.clone(),
            price: entity.price.clone(),
            quantity: entity.quantity,
            total_price: entity.total_price.clone(),
        }
    }
}

/// Body of `POST /api/transactions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub items: Vec<CreateTransactionItemRequest>,
}

/// One requested line: a product reference and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransactionItemRequest {
    /// Base-62 product id
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Reports
// =============================================================================

/// Sales summary for a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Report {
    pub total_revenue: Price,
    pub total_transactions: i64,
    pub top_popular_items: Vec<PopularItem>,
    pub top_popular_categories: Vec<PopularCategory>,
}

/// Product ranked by units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PopularItem {
    pub name: String,
    pub total_sold_qty: i64,
}

impl From<SalesRanking> for PopularItem {
    fn from(r: SalesRanking) -> Self {
        PopularItem {
            name: r.name,
            total_sold_qty: r.total_sold_qty,
        }
    }
}

/// Category ranked by units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PopularCategory {
    pub name: String,
    pub total_sold_qty: i64,
}

impl From<SalesRanking> for PopularCategory {
    fn from(r: SalesRanking) -> Self {
        PopularCategory {
            name: r.name,
            total_sold_qty: r.total_sold_qty,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
