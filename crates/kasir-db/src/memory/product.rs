use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use kasir_core::entity::{ProductEntity, ProductUpdate};

use super::MemoryState;
use crate::error::{DbError, DbResult};
use crate::repository::ProductRepository;

/// In-memory [`ProductRepository`].
#[derive(Debug, Clone)]
pub struct MemoryProductRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryProductRepository {
    pub(crate) fn new(state: Arc<RwLock<MemoryState>>) -> Self {
        MemoryProductRepository { state }
    }
}

fn ensure_category(state: &MemoryState, category_id: Option<Uuid>) -> DbResult<()> {
    match category_id {
        Some(id) if !state.categories.contains_key(&id) => Err(DbError::ForeignKeyViolation {
            message: format!("category {} does not exist", id),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_all(&self) -> DbResult<Vec<ProductEntity>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .map(|p| state.resolved_product(p))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<ProductEntity> {
        let state = self.state.read().await;
        state
            .products
            .get(&id)
            .map(|p| state.resolved_product(p))
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn find_by_name_and_active_status(
        &self,
        name: Option<&str>,
        active: Option<bool>,
    ) -> DbResult<Vec<ProductEntity>> {
        let term = name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty());

        let state = self.state.read().await;
        let found: Vec<ProductEntity> = state
            .products
            .values()
            .filter(|p| match &term {
                Some(term) => p.name.to_lowercase().contains(term.as_str()),
                None => true,
            })
            .filter(|p| active.map_or(true, |wanted| p.is_active() == wanted))
            .map(|p| state.resolved_product(p))
            .collect();

        debug!(name = ?term, active = ?active, count = found.len(), "Fetched products");
        Ok(found)
    }

    async fn insert(&self, product: ProductEntity) -> DbResult<ProductEntity> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut state = self.state.write().await;
        if state.products.contains_key(&product.id) {
            return Err(DbError::UniqueViolation {
                field: "products.id".to_string(),
                value: product.id.to_string(),
            });
        }
        ensure_category(&state, product.category_id)?;

        let resolved = state.resolved_product(&product);
        state.products.insert(product.id, product);
        Ok(resolved)
    }

    async fn update_by_id(&self, update: ProductUpdate) -> DbResult<ProductEntity> {
        debug!(id = %update.id, version = update.expected_version, "Updating product");

        let mut state = self.state.write().await;
        ensure_category(&state, update.category_id)?;

        let stored = state
            .products
            .get_mut(&update.id)
            .ok_or_else(|| DbError::not_found("Product", update.id))?;

        if stored.version != update.expected_version {
            return Err(DbError::conflict("Product", update.id, update.expected_version));
        }

        stored.name = update.name;
        stored.price = update.price;
        stored.stock = update.stock;
        stored.category_id = update.category_id;
        stored.updated_at = update.updated_at;
        stored.updated_by = update.updated_by;
        stored.version += 1;

        let updated = stored.clone();
        Ok(state.resolved_product(&updated))
    }

    async fn delete_by_id(&self, id: Uuid, _actor: &str, _at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Removing product");

        let mut state = self.state.write().await;
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::MemoryStore;
    use crate::repository::{CategoryRepository, ProductRepository};
    use crate::DbError;
    use chrono::Utc;
    use kasir_core::entity::{CategoryEntity, CategoryUpdate, ProductEntity, ProductUpdate};
    use kasir_core::money::Currency;
    use uuid::Uuid;

    fn product(name: &str, category_id: Option<Uuid>) -> ProductEntity {
        let now = Utc::now();
        ProductEntity {
            id: Uuid::now_v7(),
            name: name.to_string(),
            price: Currency::default().price(3000),
            stock: 5,
            category_id,
            category_name: None,
            created_at: now,
            created_by: "USER".to_string(),
            updated_at: now,
            updated_by: "USER".to_string(),
            deleted_at: None,
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_category_name_follows_renames() {
        let store = MemoryStore::new();
        let cat = store
            .categories()
            .insert(CategoryEntity::new(Uuid::now_v7(), "Drinks", "", "USER", Utc::now()))
            .await
            .unwrap();

        let teh = store.products().insert(product("Teh", Some(cat.id))).await.unwrap();
        assert_eq!(teh.category_name.as_deref(), Some("Drinks"));

        store
            .categories()
            .update_by_id(CategoryUpdate {
                id: cat.id,
                name: "Minuman".to_string(),
                description: String::new(),
                updated_at: Utc::now(),
                updated_by: "USER".to_string(),
                expected_version: 1,
            })
            .await
            .unwrap();

        let teh = store.products().find_by_id(teh.id).await.unwrap();
        assert_eq!(teh.category_name.as_deref(), Some("Minuman"));
    }

    #[tokio::test]
    async fn test_filter_by_name() {
        let repo = MemoryStore::new().products();
        repo.insert(product("Green Apple", None)).await.unwrap();
        repo.insert(product("Banana", None)).await.unwrap();

        let found = repo
            .find_by_name_and_active_status(Some("APPLE"), Some(true))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Green Apple");

        let inactive = repo
            .find_by_name_and_active_status(None, Some(false))
            .await
            .unwrap();
        assert!(inactive.is_empty());

        assert_eq!(
            repo.find_by_name_and_active_status(None, None).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let repo = MemoryStore::new().products();
        let err = repo
            .insert(product("Orphan", Some(Uuid::now_v7())))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = MemoryStore::new().products();
        let kopi = repo.insert(product("Kopi", None)).await.unwrap();

        let update = ProductUpdate {
            id: kopi.id,
            name: "Kopi Tubruk".to_string(),
            price: Currency::default().price(4000),
            stock: 9,
            category_id: None,
            updated_at: Utc::now(),
            updated_by: "USER".to_string(),
            expected_version: 1,
        };
        let updated = repo.update_by_id(update.clone()).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.stock, 9);

        assert!(matches!(
            repo.update_by_id(update).await.unwrap_err(),
            DbError::VersionConflict { .. }
        ));

        repo.delete_by_id(kopi.id, "USER", Utc::now()).await.unwrap();
        assert!(repo
            .delete_by_id(kopi.id, "USER", Utc::now())
            .await
            .unwrap_err()
            .is_not_found());
    }
}
