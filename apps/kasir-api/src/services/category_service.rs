//! Category service.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use kasir_core::entity::{CategoryEntity, CategoryUpdate};
use kasir_core::model::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use kasir_core::validation::validate_name;
use kasir_core::{id, ValidationError};
use kasir_db::CategoryRepository;

use super::{decode_id, ServiceResult};

const ENTITY: &str = "Category";

/// Category use cases.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    actor: String,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, actor: impl Into<String>) -> Self {
        CategoryService {
            repo,
            actor: actor.into(),
        }
    }

    pub async fn fetch_all(&self) -> ServiceResult<Vec<Category>> {
        let categories = self.repo.find_all().await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories.iter().map(Category::from).collect())
    }

    pub async fn fetch_by_id(&self, external_id: &str) -> ServiceResult<Category> {
        let id = decode_id(ENTITY, external_id)?;
        let category = self.repo.find_by_id(id).await?;
        Ok(Category::from(&category))
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> ServiceResult<Category> {
        let name = validate_name("name", &request.name)?;

        let entity = CategoryEntity::new(
            id::new_id(),
            name,
            request.description,
            &self.actor,
            Utc::now(),
        );
        let created = self.repo.insert(entity).await?;

        info!(id = %created.id, name = %created.name, "Category created");
        Ok(Category::from(&created))
    }

    /// Replaces name and description when `request.version` is current.
    pub async fn update_by_id(
        &self,
        external_id: &str,
        request: UpdateCategoryRequest,
    ) -> ServiceResult<Category> {
        let id = decode_id(ENTITY, external_id)?;
        let name = validate_name("name", &request.name)?;
        if request.version <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "version".to_string(),
            }
            .into());
        }

        let updated = self
            .repo
            .update_by_id(CategoryUpdate {
                id,
                name,
                description: request.description,
                updated_at: Utc::now(),
                updated_by: self.actor.clone(),
                expected_version: request.version,
            })
            .await?;

        info!(id = %updated.id, version = updated.version, "Category updated");
        Ok(Category::from(&updated))
    }

    pub async fn delete_by_id(&self, external_id: &str) -> ServiceResult<()> {
        let id = decode_id(ENTITY, external_id)?;
        self.repo.delete_by_id(id, &self.actor, Utc::now()).await?;
        info!(%id, "Category deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
