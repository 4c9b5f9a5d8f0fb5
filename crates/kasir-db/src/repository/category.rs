//! # Category Repository (SQLite)
//!
//! Database operations for categories.
//!
//! ## Optimistic Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE categories SET ..., version = version + 1                      │
//! │  WHERE id = ? AND version = ? AND deleted_at IS NULL                   │
//! │                                                                         │
//! │  rows_affected = 1  → updated                                          │
//! │  rows_affected = 0  → look the row up again:                           │
//! │                        missing/deleted → NotFound                      │
//! │                        present         → VersionConflict               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use kasir_core::entity::{CategoryEntity, CategoryUpdate};

use super::{parse_uuid, CategoryRepository};
use crate::error::{DbError, DbResult};

const SELECT_CATEGORY: &str = r#"
    SELECT id, name, description, created_at, created_by,
           updated_at, updated_by, deleted_at, version
    FROM categories
"#;

/// Row shape of the `categories` table.
#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    deleted_at: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<CategoryRow> for CategoryEntity {
    type Error = DbError;

    fn try_from(row: CategoryRow) -> DbResult<Self> {
        Ok(CategoryEntity {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
            deleted_at: row.deleted_at,
            version: row.version,
        })
    }
}

/// SQLite-backed [`CategoryRepository`].
///
/// ## Usage
/// ```rust,ignore
/// let repo = SqliteCategoryRepository::new(pool);
/// let drinks = repo.find_by_name("drinks").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    /// Creates a new SqliteCategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCategoryRepository { pool }
    }
}

async fn fetch_live(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<CategoryEntity>> {
    let sql = format!("{} WHERE id = ?1 AND deleted_at IS NULL", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?
        .map(CategoryEntity::try_from)
        .transpose()
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn find_all(&self) -> DbResult<Vec<CategoryEntity>> {
        let sql = format!("{} WHERE deleted_at IS NULL ORDER BY id", SELECT_CATEGORY);
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Fetched categories");
        rows.into_iter().map(CategoryEntity::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<CategoryEntity> {
        let mut conn = self.pool.acquire().await?;
        fetch_live(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    async fn find_by_name(&self, name: &str) -> DbResult<CategoryEntity> {
        let sql = format!(
            "{} WHERE lower(name) = lower(?1) AND deleted_at IS NULL ORDER BY id LIMIT 1",
            SELECT_CATEGORY
        );
        sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?
            .map(CategoryEntity::try_from)
            .transpose()?
            .ok_or_else(|| DbError::not_found("Category", name))
    }

    async fn insert(&self, category: CategoryEntity) -> DbResult<CategoryEntity> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, created_at, created_by,
                updated_at, updated_by, deleted_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(&category.created_by)
        .bind(category.updated_at)
        .bind(&category.updated_by)
        .bind(category.deleted_at)
        .bind(category.version)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update_by_id(&self, update: CategoryUpdate) -> DbResult<CategoryEntity> {
        debug!(id = %update.id, version = update.expected_version, "Updating category");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?1,
                description = ?2,
                updated_at = ?3,
                updated_by = ?4,
                version = version + 1
            WHERE id = ?5 AND version = ?6 AND deleted_at IS NULL
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
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
            (_, None) => Err(DbError::not_found("Category", update.id)),
            (_, Some(_)) => Err(DbError::conflict("Category", update.id, update.expected_version)),
        }
    }

    async fn delete_by_id(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET
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
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> SqliteCategoryRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.categories()
    }

    fn category(name: &str) -> CategoryEntity {
        CategoryEntity::new(Uuid::now_v7(), name, "desc", "USER", Utc::now())
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = repo().await;
        let drinks = repo.insert(category("Drinks")).await.unwrap();

        let found = repo.find_by_id(drinks.id).await.unwrap();
        assert_eq!(found.name, "Drinks");
        assert_eq!(found.version, 1);

        let by_name = repo.find_by_name("dRiNkS").await.unwrap();
        assert_eq!(by_name.id, drinks.id);

        assert!(repo.find_by_name("Food").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_all_orders_by_id() {
        let repo = repo().await;
        let now = Utc::now();
        let second = repo
            .insert(CategoryEntity::new(Uuid::from_u128(2), "B", "", "USER", now))
            .await
            .unwrap();
        let first = repo
            .insert(CategoryEntity::new(Uuid::from_u128(1), "A", "", "USER", now))
            .await
            .unwrap();

        let all = repo.find_all().await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_update_increments_version() {
        let repo = repo().await;
        let cat = repo.insert(category("Drinks")).await.unwrap();

        let updated = repo
            .update_by_id(CategoryUpdate {
                id: cat.id,
                name: "Beverages".to_string(),
                description: "All drinks".to_string(),
                updated_at: Utc::now(),
                updated_by: "USER".to_string(),
                expected_version: 1,
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Beverages");
        assert_eq!(updated.version, 2);
        assert_eq!(updated.created_at, cat.created_at);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts_and_leaves_row_unchanged() {
        let repo = repo().await;
        let cat = repo.insert(category("Drinks")).await.unwrap();

        let err = repo
            .update_by_id(CategoryUpdate {
                id: cat.id,
                name: "Changed".to_string(),
                description: String::new(),
                updated_at: Utc::now(),
                updated_by: "USER".to_string(),
                expected_version: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { expected: 7, .. }));

        let stored = repo.find_by_id(cat.id).await.unwrap();
        assert_eq!(stored.name, "Drinks");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let err = repo
            .update_by_id(CategoryUpdate {
                id: Uuid::now_v7(),
                name: "X".to_string(),
                description: String::new(),
                updated_at: Utc::now(),
                updated_by: "USER".to_string(),
                expected_version: 1,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_row() {
        let repo = repo().await;
        let cat = repo.insert(category("Drinks")).await.unwrap();

        repo.delete_by_id(cat.id, "USER", Utc::now()).await.unwrap();

        assert!(repo.find_by_id(cat.id).await.unwrap_err().is_not_found());
        assert!(repo.find_all().await.unwrap().is_empty());
        assert!(repo.find_by_name("Drinks").await.unwrap_err().is_not_found());
        assert!(repo
            .delete_by_id(cat.id, "USER", Utc::now())
            .await
            .unwrap_err()
            .is_not_found());

        // Row is still there
        let deleted: Option<String> =
            sqlx::query_scalar("SELECT deleted_at FROM categories WHERE id = ?1")
                .bind(cat.id.to_string())
                .fetch_one(&repo.pool)
                .await
                .unwrap();
        assert!(deleted.is_some());
    }
}
