//! # Transaction Service
//!
//! Checkout and sales reports.
//!
//! ## Checkout
//! ```text
//! items ──► validate ──► look up each product ──► check stock (cumulative)
//!                                                      │
//!                              snapshot name/category/price, line totals
//!                                                      │
//!                                                      ▼
//!              TransactionRepository::create_transaction (all-or-nothing)
//! ```
//!
//! The availability check here gives early, named errors. The repository
//! re-checks every decrement inside its own atomic unit, so a sale racing
//! another still cannot drive stock negative.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use kasir_core::entity::{TransactionDetailEntity, TransactionEntity};
use kasir_core::model::{
    CreateTransactionRequest, PopularCategory, PopularItem, Report, Transaction,
};
use kasir_core::period::resolve_local_range;
use kasir_core::validation::validate_quantity;
use kasir_core::{id, CoreError, Currency};
use kasir_db::{ProductRepository, TransactionRepository};

use super::{decode_id, ServiceResult};

/// Checkout and report use cases.
#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    products: Arc<dyn ProductRepository>,
    actor: String,
    currency: Currency,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        products: Arc<dyn ProductRepository>,
        actor: impl Into<String>,
        currency: Currency,
    ) -> Self {
        TransactionService {
            transactions,
            products,
            actor: actor.into(),
            currency,
        }
    }

    /// Records a sale and decrements stock for every line.
    ///
    /// The returned transaction is built from the snapshots taken here, not
    /// re-read from storage.
    pub async fn create(&self, request: CreateTransactionRequest) -> ServiceResult<Transaction> {
        if request.items.is_empty() {
            return Err(CoreError::EmptyTransaction.into());
        }

        let transaction_id = id::new_id();
        let now = Utc::now();

        let mut requested: HashMap<Uuid, i64> = HashMap::new();
        let mut details = Vec::with_capacity(request.items.len());
        let mut total_items: i64 = 0;
        let mut total_price = self.currency.zero();

        for item in &request.items {
            validate_quantity(item.quantity)?;
            let product_id = decode_id("Product", &item.product_id)?;
            let product = self.products.find_by_id(product_id).await?;

            let wanted = requested.entry(product_id).or_insert(0);
            *wanted = wanted
                .checked_add(item.quantity)
                .ok_or_else(|| CoreError::PriceOverflow("quantity".to_string()))?;
            if *wanted > product.stock {
                warn!(
                    product = %product.name,
                    wanted = *wanted,
                    stock = product.stock,
                    "Insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                }
                .into());
            }

            let price = self.currency.price(product.price.amount);
            let line_total = price
                .checked_multiply_quantity(item.quantity)
                .ok_or_else(|| CoreError::PriceOverflow(format!("line total of {}", product.name)))?;

            total_items = total_items
                .checked_add(item.quantity)
                .ok_or_else(|| CoreError::PriceOverflow("total items".to_string()))?;
            total_price = total_price
                .checked_add(&line_total)
                .ok_or_else(|| CoreError::PriceOverflow("total price".to_string()))?;

            details.push(TransactionDetailEntity {
                id: id::new_id(),
                transaction_id,
                product_id: Some(product.id),
                product_name: product.name,
                category_id: product.category_id,
                category_name: product.category_name.unwrap_or_default(),
                price,
                quantity: item.quantity,
                total_price: line_total,
                created_at: now,
                created_by: self.actor.clone(),
            });
        }

        let header = TransactionEntity {
            id: transaction_id,
            total_items,
            total_price,
            created_at: now,
            created_by: self.actor.clone(),
        };

        self.transactions.create_transaction(&header, &details).await?;

        info!(
            id = %header.id,
            items = header.total_items,
            total = %header.total_price,
            "Transaction created"
        );
        Ok(Transaction::from_parts(&header, &details))
    }

    /// Revenue, count and top sellers for a date window or named period.
    pub async fn fetch_report(&self, start: &str, end: &str, period: &str) -> ServiceResult<Report> {
        let range = resolve_local_range(start, end, period)?;
        let stats = self.transactions.get_report_stats(&range).await?;

        Ok(Report {
            total_revenue: self.currency.price(stats.total_revenue),
            total_transactions: stats.total_transactions,
            top_popular_items: stats.top_items.into_iter().map(PopularItem::from).collect(),
            top_popular_categories: stats
                .top_categories
                .into_iter()
                .map(PopularCategory::from)
                .collect(),
        })
    }

    pub async fn fetch_most_popular_category(
        &self,
        start: &str,
        end: &str,
    ) -> ServiceResult<PopularCategory> {
        let range = resolve_local_range(start, end, "")?;
        let top = self.transactions.get_most_popular_category(&range).await?;
        Ok(PopularCategory::from(top))
    }

    pub async fn fetch_most_popular_product(
        &self,
        start: &str,
        end: &str,
    ) -> ServiceResult<PopularItem> {
        let range = resolve_local_range(start, end, "")?;
        let top = self.transactions.get_most_popular_product(&range).await?;
        Ok(PopularItem::from(top))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
