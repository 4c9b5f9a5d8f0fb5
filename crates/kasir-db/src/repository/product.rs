//! # Product Repository (SQLite)
//!
//! Database operations for products.
//!
//! ## Category Resolution
//! Products store only `category_id`. Every read joins the live category row
//! so a renamed category shows its new name and a deleted one shows none:
//! ```text
//! products p LEFT JOIN categories c
//!   ON c.id = p.category_id AND c.deleted_at IS NULL
//! ```
//!
//! ## Search
//! Name filtering is a case-insensitive substring match via
//! `instr(lower(name), lower(?))`, so `%` and `_` in the term are literal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use kasir_core::entity::{ProductEntity, ProductUpdate};
use kasir_core::money::Price;

use super::{parse_optional_uuid, parse_uuid, ProductRepository};
use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.name, p.price_amount, p.price_scale, p.currency, p.stock,
           p.category_id, c.name AS category_name,
           p.created_at, p.created_by, p.updated_at, p.updated_by,
           p.deleted_at, p.version
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price_amount: i64,
    price_scale: i64,
    currency: String,
    stock: i64,
    category_id: Option<String>,
    category_name: Option<String>,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    deleted_at: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<ProductRow> for ProductEntity {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let scale = u32::try_from(row.price_scale)
            .map_err(|_| DbError::CorruptRow(format!("invalid price scale {}", row.price_scale)))?;

        Ok(ProductEntity {
            id: parse_uuid(&row.id)?,
            name: row.name,
            price: Price::new(row.price_amount, scale, row.currency),
            stock: row.stock,
            category_id: parse_optional_uuid(row.category_id.as_deref())?,
            category_name: row.category_name,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
            deleted_at: row.deleted_at,
            version: row.version,
        })
    }
}

/// SQLite-backed [`ProductRepository`].
#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// Creates a new SqliteProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductRepository { pool }
    }
}

async fn fetch_live(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<ProductEntity>> {
    let sql = format!("{} WHERE p.id = ?1 AND p.deleted_at IS NULL", SELECT_PRODUCT);
    sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?
        .map(ProductEntity::try_from)
        .transpose()
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn find_all(&self) -> DbResult<Vec<ProductEntity>> {
        self.find_by_name_and_active_status(None, Some(true)).await
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<ProductEntity> {
        let mut conn = self.pool.acquire().await?;
        fetch_live(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Builds the WHERE clause from whichever filters are present.
    ///
    /// ```text
    /// (None,    None)        → non-deleted products (same as find_all)
    /// (Some(n), None)        → name match, deleted or not
    /// (_,       Some(true))  → deleted_at IS NULL
    /// (_,       Some(false)) → deleted_at IS NOT NULL
    /// ```
    async fn find_by_name_and_active_status(
        &self,
        name: Option<&str>,
        active: Option<bool>,
    ) -> DbResult<Vec<ProductEntity>> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let active = match (name, active) {
            (None, None) => Some(true),
            (_, active) => active,
        };

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_PRODUCT);
        qb.push(" WHERE 1 = 1");

        if let Some(term) = name {
            qb.push(" AND instr(lower(p.name), lower(")
                .push_bind(term.to_string())
                .push(")) > 0");
        }

        match active {
            Some(true) => {
                qb.push(" AND p.deleted_at IS NULL");
            }
            Some(false) => {
                qb.push(" AND p.deleted_at IS NOT NULL");
            }
            None => {}
        }

        qb.push(" ORDER BY p.id");

        let rows = qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;

        debug!(
            name = ?name,
            active = ?active,
            count = rows.len(),
            "Fetched products"
        );

        rows.into_iter().map(ProductEntity::try_from).collect()
    }

    async fn insert(&self, product: ProductEntity) -> DbResult<ProductEntity> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_amount, price_scale, currency, stock, category_id,
                created_at, created_by, updated_at, updated_by, deleted_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(product.price.amount)
        .bind(product.price.scale as i64)
        .bind(&product.price.currency)
        .bind(product.stock)
        .bind(product.category_id.map(|id| id.to_string()))
        .bind(product.created_at)
        .bind(&product.created_by)
        .bind(product.updated_at)
        .bind(&product.updated_by)
        .bind(product.deleted_at)
        .bind(product.version)
        .execute(&mut *conn)
        .await?;

        fetch_live(&mut conn, product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product.id))
    }

    async fn update_by_id(&self, update: ProductUpdate) -> DbResult<ProductEntity> {
        debug!(id = %update.id, version = update.expected_version, "Updating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?1,
                price_amount = ?2,
                price_scale = ?3,
                currency = ?4,
                stock = ?5,
                category_id = ?6,
                updated_at = ?7,
                updated_by = ?8,
                version = version + 1
            WHERE id = ?9 AND version = ?10 AND deleted_at IS NULL
            "#,
        )
        .bind(&update.name)
        .bind(update.price.amount)
        .bind(update.price.scale as i64)
        .bind(&update.price.currency)
        .bind(update.stock)
        .bind(update.category_id.map(|id| id.to_string()))
        .bind(update.updated_at)
        .bind(&update.updated_by)
        .bind(update.id.to_string())
        .bind(update.expected_version)
        .execute(&mut *tx)
        .await?;

        let current = fetch_live(&mut tx, update.id).await?;
        match (result.rows_affected(), current) {
            (1, Some(updated)) => {
                tx.commit().await?;
                Ok(updated)
            }
            (_, None) => Err(DbError::not_found("Product", update.id)),
            (_, Some(_)) => Err(DbError::conflict("Product", update.id, update.expected_version)),
        }
    }

    async fn delete_by_id(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                deleted_at = ?1,
                updated_at = ?1,
                updated_by = ?2
            WHERE id = ?3 AND deleted_at IS NULL
            "#,
        )
        .bind(at)
        .bind(actor)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
