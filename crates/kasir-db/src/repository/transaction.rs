//! # Transaction Repository (SQLite)
//!
//! Persists sales and aggregates them for reports.
//!
//! ## Atomic Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT transactions (header)                                        │
//! │    for each detail:                                                    │
//! │      INSERT transaction_details (snapshot)                             │
//! │      UPDATE products SET stock = stock - q, version = version + 1      │
//! │        WHERE id = ? AND deleted_at IS NULL AND stock >= q              │
//! │      rows_affected = 0 → ROLLBACK, StockUnavailable / NotFound         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guarded decrement is re-evaluated by SQLite at write time, so two
//! concurrent sales cannot both take the last unit.

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use kasir_core::entity::{ReportStats, SalesRanking, TransactionDetailEntity, TransactionEntity};
use kasir_core::{DateRange, TOP_RANKING_LIMIT, UNCATEGORIZED};

use super::{no_sales, TransactionRepository};
use crate::error::{DbError, DbResult};

/// Units sold per snapshot product name.
const PRODUCT_RANKING: &str = r#"
    SELECT d.product_name AS name, SUM(d.quantity) AS total_sold_qty
    FROM transaction_details d
    JOIN transactions t ON t.id = d.transaction_id
    WHERE t.created_at >= ?1 AND t.created_at <= ?2
    GROUP BY d.product_name
    ORDER BY total_sold_qty DESC, name ASC
    LIMIT ?3
"#;

/// Units sold per snapshot category name; lines without one are grouped
/// under the name bound as `?4`.
const CATEGORY_RANKING: &str = r#"
    SELECT COALESCE(NULLIF(d.category_name, ''), ?4) AS name,
           SUM(d.quantity) AS total_sold_qty
    FROM transaction_details d
    JOIN transactions t ON t.id = d.transaction_id
    WHERE t.created_at >= ?1 AND t.created_at <= ?2
    GROUP BY COALESCE(NULLIF(d.category_name, ''), ?4)
    ORDER BY total_sold_qty DESC, name ASC
    LIMIT ?3
"#;

#[derive(Debug, FromRow)]
struct RankingRow {
    name: String,
    total_sold_qty: i64,
}

impl From<RankingRow> for SalesRanking {
    fn from(row: RankingRow) -> Self {
        SalesRanking {
            name: row.name,
            total_sold_qty: row.total_sold_qty,
        }
    }
}

/// SQLite-backed [`TransactionRepository`].
#[derive(Debug, Clone)]
pub struct SqliteTransactionRepository {
    pool: SqlitePool,
}

impl SqliteTransactionRepository {
    /// Creates a new SqliteTransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteTransactionRepository { pool }
    }

    async fn product_ranking(&self, range: &DateRange, limit: usize) -> DbResult<Vec<SalesRanking>> {
        let rows = sqlx::query_as::<_, RankingRow>(PRODUCT_RANKING)
            .bind(range.start)
            .bind(range.end)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SalesRanking::from).collect())
    }

    async fn category_ranking(&self, range: &DateRange, limit: usize) -> DbResult<Vec<SalesRanking>> {
        let rows = sqlx::query_as::<_, RankingRow>(CATEGORY_RANKING)
            .bind(range.start)
            .bind(range.end)
            .bind(limit as i64)
            .bind(UNCATEGORIZED)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SalesRanking::from).collect())
    }
}

/// Decrements stock for one detail line, or explains why it could not.
async fn decrement_stock(
    conn: &mut SqliteConnection,
    header: &TransactionEntity,
    detail: &TransactionDetailEntity,
) -> DbResult<()> {
    let product_id = detail
        .product_id
        .ok_or_else(|| DbError::not_found("Product", &detail.product_name))?;

    let result = sqlx::query(
        r#"
        UPDATE products SET
            stock = stock - ?1,
            version = version + 1,
            updated_at = ?2,
            updated_by = ?3
        WHERE id = ?4 AND deleted_at IS NULL AND stock >= ?1
        "#,
    )
    .bind(detail.quantity)
    .bind(header.created_at)
    .bind(&header.created_by)
    .bind(product_id.to_string())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let live: Option<String> =
        sqlx::query_scalar("SELECT name FROM products WHERE id = ?1 AND deleted_at IS NULL")
            .bind(product_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

    match live {
        Some(name) => {
            warn!(product = %name, quantity = detail.quantity, "Stock unavailable at commit");
            Err(DbError::StockUnavailable { product: name })
        }
        None => Err(DbError::not_found("Product", product_id)),
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn create_transaction(
        &self,
        header: &TransactionEntity,
        details: &[TransactionDetailEntity],
    ) -> DbResult<()> {
        debug!(
            id = %header.id,
            lines = details.len(),
            total = header.total_price.amount,
            "Creating transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, total_items, total_price_amount, price_scale, currency,
                created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(header.id.to_string())
        .bind(header.total_items)
        .bind(header.total_price.amount)
        .bind(header.total_price.scale as i64)
        .bind(&header.total_price.currency)
        .bind(header.created_at)
        .bind(&header.created_by)
        .execute(&mut *tx)
        .await?;

        for detail in details {
            sqlx::query(
                r#"
                INSERT INTO transaction_details (
                    id, transaction_id, product_id, product_name, category_id,
                    category_name, price_amount, price_scale, currency, quantity,
                    total_price_amount, created_at, created_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(detail.id.to_string())
            .bind(detail.transaction_id.to_string())
            .bind(detail.product_id.map(|id| id.to_string()))
            .bind(&detail.product_name)
            .bind(detail.category_id.map(|id| id.to_string()))
            .bind(&detail.category_name)
            .bind(detail.price.amount)
            .bind(detail.price.scale as i64)
            .bind(&detail.price.currency)
            .bind(detail.quantity)
            .bind(detail.total_price.amount)
            .bind(detail.created_at)
            .bind(&detail.created_by)
            .execute(&mut *tx)
            .await?;

            // Dropping `tx` on error rolls everything back
            decrement_stock(&mut tx, header, detail).await?;
        }

        tx.commit().await?;

        debug!(id = %header.id, "Transaction committed");
        Ok(())
    }

    async fn get_report_stats(&self, range: &DateRange) -> DbResult<ReportStats> {
        let (total_revenue, total_transactions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_price_amount), 0), COUNT(*)
            FROM transactions
            WHERE created_at >= ?1 AND created_at <= ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let top_items = self.product_ranking(range, TOP_RANKING_LIMIT).await?;
        let top_categories = self.category_ranking(range, TOP_RANKING_LIMIT).await?;

        debug!(
            start = %range.start,
            end = %range.end,
            total_transactions,
            "Computed report stats"
        );

        Ok(ReportStats {
            total_revenue,
            total_transactions,
            top_items,
            top_categories,
        })
    }

    async fn get_most_popular_category(&self, range: &DateRange) -> DbResult<SalesRanking> {
        self.category_ranking(range, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| no_sales(range))
    }

    async fn get_most_popular_product(&self, range: &DateRange) -> DbResult<SalesRanking> {
        self.product_ranking(range, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| no_sales(range))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::{requested_per_product, CategoryRepository, ProductRepository};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kasir_core::entity::{CategoryEntity, ProductEntity};
    use kasir_core::money::Currency;
    use uuid::Uuid;

    struct Fixture {
        db: Database,
        repo: SqliteTransactionRepository,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Fixture {
            repo: db.transactions(),
            db,
        }
    }

    async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> ProductEntity {
        let now = Utc::now();
        db.products()
            .insert(ProductEntity {
                id: Uuid::now_v7(),
                name: name.to_string(),
                price: Currency::default().price(price),
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
            .map(|(product, category, qty)| TransactionDetailEntity {
                id: Uuid::now_v7(),
                transaction_id: header_id,
                product_id: Some(product.id),
                product_name: product.name.clone(),
                category_id: None,
                category_name: category.to_string(),
                price: product.price.clone(),
                quantity: *qty,
                total_price: idr.price(product.price.amount * qty),
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

    fn day(d: u32) -> DateRange {
        DateRange {
            start: Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, d, 23, 59, 59).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_decrements_stock() {
        let f = fixture().await;
        let kopi = seed_product(&f.db, "Kopi", 1000, 10).await;

        let (header, details) = sale(Utc::now(), &[(&kopi, "Drinks", 2)]);
        f.repo.create_transaction(&header, &details).await.unwrap();

        let kopi_after = f.db.products().find_by_id(kopi.id).await.unwrap();
        assert_eq!(kopi_after.stock, 8);
        assert_eq!(kopi_after.version, 2);

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_details")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_shortfall_rolls_back_everything() {
        let f = fixture().await;
        let kopi = seed_product(&f.db, "Kopi", 1000, 10).await;
        let teh = seed_product(&f.db, "Teh", 500, 1).await;

        let (header, details) = sale(Utc::now(), &[(&kopi, "", 2), (&teh, "", 3)]);
        let err = f.repo.create_transaction(&header, &details).await.unwrap_err();
        assert!(matches!(err, DbError::StockUnavailable { ref product } if product == "Teh"));

        // Kopi decrement was rolled back with the rest
        assert_eq!(f.db.products().find_by_id(kopi.id).await.unwrap().stock, 10);
        let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(headers, 0);
    }

    #[tokio::test]
    async fn test_repeated_product_is_checked_cumulatively() {
        let f = fixture().await;
        let kopi = seed_product(&f.db, "Kopi", 1000, 3).await;

        let (header, details) = sale(Utc::now(), &[(&kopi, "", 2), (&kopi, "", 2)]);
        assert_eq!(requested_per_product(&details)[&kopi.id], 4);

        let err = f.repo.create_transaction(&header, &details).await.unwrap_err();
        assert!(matches!(err, DbError::StockUnavailable { .. }));
        assert_eq!(f.db.products().find_by_id(kopi.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_deleted_product_is_not_found() {
        let f = fixture().await;
        let kopi = seed_product(&f.db, "Kopi", 1000, 3).await;
        f.db.products()
            .delete_by_id(kopi.id, "USER", Utc::now())
            .await
            .unwrap();

        let (header, details) = sale(Utc::now(), &[(&kopi, "", 1)]);
        let err = f.repo.create_transaction(&header, &details).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_report_stats_and_rankings() {
        let f = fixture().await;
        let drinks = f
            .db
            .categories()
            .insert(CategoryEntity::new(Uuid::now_v7(), "Drinks", "", "USER", Utc::now()))
            .await
            .unwrap();
        let kopi = seed_product(&f.db, "Kopi", 1000, 100).await;
        let teh = seed_product(&f.db, "Teh", 500, 100).await;
        let roti = seed_product(&f.db, "Roti", 2000, 100).await;

        let noon = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        for (header, details) in [
            sale(noon, &[(&kopi, &drinks.name, 3), (&roti, "", 1)]),
            sale(noon + Duration::hours(1), &[(&teh, &drinks.name, 3)]),
            // Next day, outside the window
            sale(noon + Duration::days(1), &[(&roti, "", 50)]),
        ] {
            f.repo.create_transaction(&header, &details).await.unwrap();
        }

        let stats = f.repo.get_report_stats(&day(15)).await.unwrap();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_revenue, 3000 + 2000 + 1500);

        // Kopi and Teh tie at 3: name ascending
        let items: Vec<(&str, i64)> = stats
            .top_items
            .iter()
            .map(|r| (r.name.as_str(), r.total_sold_qty))
            .collect();
        assert_eq!(items, vec![("Kopi", 3), ("Teh", 3), ("Roti", 1)]);

        let categories: Vec<(&str, i64)> = stats
            .top_categories
            .iter()
            .map(|r| (r.name.as_str(), r.total_sold_qty))
            .collect();
        assert_eq!(categories, vec![("Drinks", 6), (UNCATEGORIZED, 1)]);

        let popular = f.repo.get_most_popular_product(&day(15)).await.unwrap();
        assert_eq!(popular.name, "Kopi");
        let popular = f.repo.get_most_popular_category(&day(16)).await.unwrap();
        assert_eq!(popular.name, UNCATEGORIZED);
        assert_eq!(popular.total_sold_qty, 50);
    }

    #[tokio::test]
    async fn test_empty_window() {
        let f = fixture().await;

        let stats = f.repo.get_report_stats(&day(1)).await.unwrap();
        assert_eq!(stats, ReportStats::default());

        assert!(f.repo.get_most_popular_product(&day(1)).await.unwrap_err().is_not_found());
        assert!(f.repo.get_most_popular_category(&day(1)).await.unwrap_err().is_not_found());
    }
}
