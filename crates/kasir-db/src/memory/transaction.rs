use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use kasir_core::entity::{ReportStats, SalesRanking, TransactionDetailEntity, TransactionEntity};
use kasir_core::{DateRange, TOP_RANKING_LIMIT, UNCATEGORIZED};

use super::MemoryState;
use crate::error::{DbError, DbResult};
use crate::repository::{no_sales, rank_sales, requested_per_product, TransactionRepository};

/// In-memory [`TransactionRepository`].
///
/// A sale takes the store's write lock once: every decrement is checked
/// first, and nothing is written unless all of them fit.
#[derive(Debug, Clone)]
pub struct MemoryTransactionRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryTransactionRepository {
    pub(crate) fn new(state: Arc<RwLock<MemoryState>>) -> Self {
        MemoryTransactionRepository { state }
    }
}

/// Lines whose transaction falls inside `range`.
fn details_in_range<'a>(
    state: &'a MemoryState,
    range: &DateRange,
) -> impl Iterator<Item = &'a TransactionDetailEntity> {
    let ids: Vec<Uuid> = state
        .transactions
        .iter()
        .filter(|t| range.contains(&t.created_at))
        .map(|t| t.id)
        .collect();
    state
        .details
        .iter()
        .filter(move |d| ids.contains(&d.transaction_id))
}

fn product_totals(state: &MemoryState, range: &DateRange) -> HashMap<String, i64> {
    let mut totals = HashMap::new();
    for detail in details_in_range(state, range) {
        *totals.entry(detail.product_name.clone()).or_insert(0) += detail.quantity;
    }
    totals
}

fn category_totals(state: &MemoryState, range: &DateRange) -> HashMap<String, i64> {
    let mut totals = HashMap::new();
    for detail in details_in_range(state, range) {
        let name = if detail.category_name.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            detail.category_name.clone()
        };
        *totals.entry(name).or_insert(0) += detail.quantity;
    }
    totals
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn create_transaction(
        &self,
        header: &TransactionEntity,
        details: &[TransactionDetailEntity],
    ) -> DbResult<()> {
        debug!(id = %header.id, lines = details.len(), "Creating transaction");

        let mut state = self.state.write().await;

        let requested = requested_per_product(details);
        for detail in details {
            let product_id = detail
                .product_id
                .ok_or_else(|| DbError::not_found("Product", &detail.product_name))?;
            let product = state
                .products
                .get(&product_id)
                .ok_or_else(|| DbError::not_found("Product", product_id))?;
            let wanted = requested.get(&product_id).copied().unwrap_or(0);
            if product.stock < wanted {
                warn!(product = %product.name, wanted, stock = product.stock, "Stock unavailable at commit");
                return Err(DbError::StockUnavailable {
                    product: product.name.clone(),
                });
            }
        }

        for (product_id, quantity) in &requested {
            if let Some(product) = state.products.get_mut(product_id) {
                product.stock -= quantity;
                product.version += 1;
                product.updated_at = header.created_at;
                product.updated_by = header.created_by.clone();
            }
        }

        state.transactions.push(header.clone());
        state.details.extend_from_slice(details);
        Ok(())
    }

    async fn get_report_stats(&self, range: &DateRange) -> DbResult<ReportStats> {
        let state = self.state.read().await;

        let (total_revenue, total_transactions) = state
            .transactions
            .iter()
            .filter(|t| range.contains(&t.created_at))
            .fold((0i64, 0i64), |(revenue, count), t| {
                (revenue.saturating_add(t.total_price.amount), count + 1)
            });

        Ok(ReportStats {
            total_revenue,
            total_transactions,
            top_items: rank_sales(product_totals(&state, range), TOP_RANKING_LIMIT),
            top_categories: rank_sales(category_totals(&state, range), TOP_RANKING_LIMIT),
        })
    }

    async fn get_most_popular_category(&self, range: &DateRange) -> DbResult<SalesRanking> {
        let state = self.state.read().await;
        rank_sales(category_totals(&state, range), 1)
            .into_iter()
            .next()
            .ok_or_else(|| no_sales(range))
    }

    async fn get_most_popular_product(&self, range: &DateRange) -> DbResult<SalesRanking> {
        let state = self.state.read().await;
        rank_sales(product_totals(&state, range), 1)
            .into_iter()
            .next()
            .ok_or_else(|| no_sales(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::ProductRepository;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kasir_core::entity::ProductEntity;
    use kasir_core::money::Currency;

    async fn seed(store: &MemoryStore, name: &str, stock: i64) -> ProductEntity {
        let now = Utc::now();
        store
            .products()
            .insert(ProductEntity {
                id: Uuid::now_v7(),
                name: name.to_string(),
                price: Currency::default().price(1000),
                stock,
                category_id: None,
                category_name: None,
                created_at: now,
                created_by: "USER".to_string(),
                updated_at: now,
                updated_by: "USER".to_string(),
                deleted_at: None,
                version: 1,
            })
            .await
            .unwrap()
    }

    fn sale(
        at: DateTime<Utc>,
        lines: &[(&ProductEntity, &str, i64)],
    ) -> (TransactionEntity, Vec<TransactionDetailEntity>) {
        let idr = Currency::default();
        let header_id = Uuid::now_v7();
        let details: Vec<TransactionDetailEntity> = lines
            .iter()
            .map(|(p, category, qty)| TransactionDetailEntity {
                id: Uuid::now_v7(),
                transaction_id: header_id,
                product_id: Some(p.id),
                product_name: p.name.clone(),
                category_id: None,
                category_name: category.to_string(),
                price: p.price.clone(),
                quantity: *qty,
                total_price: idr.price(p.price.amount * qty),
                created_at: at,
                created_by: "USER".to_string(),
            })
            .collect();
        let header = TransactionEntity {
            id: header_id,
            total_items: details.iter().map(|d| d.quantity).sum(),
            total_price: idr.price(details.iter().map(|d| d.total_price.amount).sum()),
            created_at: at,
            created_by: "USER".to_string(),
        };
        (header, details)
    }

    fn may(d: u32) -> DateRange {
        DateRange {
            start: Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, d, 23, 59, 59).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_all_or_nothing() {
        let store = MemoryStore::new();
        let kopi = seed(&store, "Kopi", 5).await;
        let teh = seed(&store, "Teh", 1).await;
        let repo = store.transactions();

        let (header, details) = sale(Utc::now(), &[(&kopi, "", 2), (&teh, "", 2)]);
        let err = repo.create_transaction(&header, &details).await.unwrap_err();
        assert!(matches!(err, DbError::StockUnavailable { ref product } if product == "Teh"));
        assert_eq!(store.products().find_by_id(kopi.id).await.unwrap().stock, 5);

        let (header, details) = sale(Utc::now(), &[(&kopi, "", 2), (&kopi, "", 3)]);
        repo.create_transaction(&header, &details).await.unwrap();
        let kopi = store.products().find_by_id(kopi.id).await.unwrap();
        assert_eq!(kopi.stock, 0);
        assert_eq!(kopi.version, 2);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let store = MemoryStore::new();
        let ghost = seed(&store, "Ghost", 5).await;
        store
            .products()
            .delete_by_id(ghost.id, "USER", Utc::now())
            .await
            .unwrap();

        let (header, details) = sale(Utc::now(), &[(&ghost, "", 1)]);
        let err = store
            .transactions()
            .create_transaction(&header, &details)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_report_aggregation() {
        let store = MemoryStore::new();
        let kopi = seed(&store, "Kopi", 100).await;
        let roti = seed(&store, "Roti", 100).await;
        let repo = store.transactions();

        let noon = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        for (header, details) in [
            sale(noon, &[(&kopi, "Drinks", 2), (&roti, "", 4)]),
            sale(noon + Duration::minutes(5), &[(&kopi, "Drinks", 1)]),
            sale(noon + Duration::days(1), &[(&kopi, "Drinks", 10)]),
        ] {
            repo.create_transaction(&header, &details).await.unwrap();
        }

        let stats = repo.get_report_stats(&may(15)).await.unwrap();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_revenue, 7000);
        assert_eq!(stats.top_items[0].name, "Roti");
        assert_eq!(stats.top_items[1].total_sold_qty, 3);
        assert_eq!(stats.top_categories[0].name, UNCATEGORIZED);

        let popular = repo.get_most_popular_category(&may(15)).await.unwrap();
        assert_eq!(popular.total_sold_qty, 4);
        let popular = repo.get_most_popular_product(&may(16)).await.unwrap();
        assert_eq!(popular.name, "Kopi");
        assert!(repo.get_most_popular_product(&may(17)).await.unwrap_err().is_not_found());
    }
}
