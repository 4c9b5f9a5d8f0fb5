use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use kasir_core::entity::{CategoryEntity, CategoryUpdate};

use super::MemoryState;
use crate::error::{DbError, DbResult};
use crate::repository::CategoryRepository;

/// In-memory [`CategoryRepository`].
#[derive(Debug, Clone)]
pub struct MemoryCategoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCategoryRepository {
    pub(crate) fn new(state: Arc<RwLock<MemoryState>>) -> Self {
        MemoryCategoryRepository { state }
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_all(&self) -> DbResult<Vec<CategoryEntity>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<CategoryEntity> {
        let state = self.state.read().await;
        state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    async fn find_by_name(&self, name: &str) -> DbResult<CategoryEntity> {
        let wanted = name.trim().to_lowercase();
        let state = self.state.read().await;
        state
            .categories
            .values()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| DbError::not_found("Category", name))
    }

    async fn insert(&self, category: CategoryEntity) -> DbResult<CategoryEntity> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        let mut state = self.state.write().await;
        if state.categories.contains_key(&category.id) {
            return Err(DbError::UniqueViolation {
                field: "categories.id".to_string(),
                value: category.id.to_string(),
            });
        }
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_by_id(&self, update: CategoryUpdate) -> DbResult<CategoryEntity> {
        debug!(id = %update.id, version = update.expected_version, "Updating category");

        let mut state = self.state.write().await;
        let stored = state
            .categories
            .get_mut(&update.id)
            .ok_or_else(|| DbError::not_found("Category", update.id))?;

        if stored.version != update.expected_version {
            return Err(DbError::conflict("Category", update.id, update.expected_version));
        }

        stored.name = update.name;
        stored.description = update.description;
        stored.updated_at = update.updated_at;
        stored.updated_by = update.updated_by;
        stored.version += 1;

        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: Uuid, _actor: &str, _at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Removing category");

        let mut state = self.state.write().await;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Category", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::MemoryStore;
    use crate::repository::CategoryRepository;
    use chrono::Utc;
    use kasir_core::entity::{CategoryEntity, CategoryUpdate};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = MemoryStore::new().categories();
        let cat = repo
            .insert(CategoryEntity::new(Uuid::now_v7(), "Snacks", "", "USER", Utc::now()))
            .await
            .unwrap();

        assert_eq!(repo.find_by_name(" SNACKS ").await.unwrap().id, cat.id);

        let updated = repo
            .update_by_id(CategoryUpdate {
                id: cat.id,
                name: "Cemilan".to_string(),
                description: "Local snacks".to_string(),
                updated_at: Utc::now(),
                updated_by: "ADMIN".to_string(),
                expected_version: 1,
            })
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.updated_by, "ADMIN");

        repo.delete_by_id(cat.id, "USER", Utc::now()).await.unwrap();
        assert!(repo.find_by_id(cat.id).await.unwrap_err().is_not_found());
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let repo = MemoryStore::new().categories();
        let cat = repo
            .insert(CategoryEntity::new(Uuid::now_v7(), "Snacks", "", "USER", Utc::now()))
            .await
            .unwrap();

        let err = repo
            .update_by_id(CategoryUpdate {
                id: cat.id,
                name: "X".to_string(),
                description: String::new(),
                updated_at: Utc::now(),
                updated_by: "USER".to_string(),
                expected_version: 0,
            })
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(repo.find_by_id(cat.id).await.unwrap().name, "Snacks");
    }
}
