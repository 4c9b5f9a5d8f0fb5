//! Product service.
//!
//! Products reference their category by name on the wire; the service
//! resolves that name to an id before anything reaches the repository.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use kasir_core::entity::{ProductEntity, ProductUpdate};
use kasir_core::model::{CreateProductRequest, Product, UpdateProductRequest};
use kasir_core::validation::{parse_active_filter, validate_name, validate_non_negative};
use kasir_core::{id, Currency, ValidationError};
use kasir_db::{CategoryRepository, ProductRepository};

use super::{decode_id, ServiceResult};

const ENTITY: &str = "Product";

/// Product use cases.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    actor: String,
    currency: Currency,
}

/// Category reference resolved from a request.
struct CategoryRef {
    id: Option<Uuid>,
    name: Option<String>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        actor: impl Into<String>,
        currency: Currency,
    ) -> Self {
        ProductService {
            products,
            categories,
            actor: actor.into(),
            currency,
        }
    }

    pub async fn fetch_all(&self) -> ServiceResult<Vec<Product>> {
        let products = self.products.find_all().await?;
        Ok(products.iter().map(Product::from).collect())
    }

    /// Lists products filtered by name substring and raw `active` flag.
    ///
    /// Without either filter this is [`ProductService::fetch_all`].
    pub async fn fetch(
        &self,
        name: Option<&str>,
        active: Option<&str>,
    ) -> ServiceResult<Vec<Product>> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let active = parse_active_filter(active)?;

        if name.is_none() && active.is_none() {
            return self.fetch_all().await;
        }

        let products = self
            .products
            .find_by_name_and_active_status(name, active)
            .await?;
        debug!(?name, ?active, count = products.len(), "Filtered products");
        Ok(products.iter().map(Product::from).collect())
    }

    pub async fn fetch_by_id(&self, external_id: &str) -> ServiceResult<Product> {
        let id = decode_id(ENTITY, external_id)?;
        let product = self.products.find_by_id(id).await?;
        Ok(Product::from(&product))
    }

    pub async fn create(&self, request: CreateProductRequest) -> ServiceResult<Product> {
        let name = validate_name("name", &request.name)?;
        validate_non_negative("price", request.price)?;
        validate_non_negative("stocks", request.stocks)?;
        let category = self.resolve_category(&request.category).await?;

        let now = Utc::now();
        let entity = ProductEntity {
            id: id::new_id(),
            name,
            price: self.currency.price(request.price),
            stock: request.stocks,
            category_id: category.id,
            category_name: category.name,
            created_at: now,
            created_by: self.actor.clone(),
            updated_at: now,
            updated_by: self.actor.clone(),
            deleted_at: None,
            version: 1,
        };
        let created = self.products.insert(entity).await?;

        info!(id = %created.id, name = %created.name, "Product created");
        Ok(Product::from(&created))
    }

    pub async fn update_by_id(
        &self,
        external_id: &str,
        request: UpdateProductRequest,
    ) -> ServiceResult<Product> {
        let id = decode_id(ENTITY, external_id)?;
        let name = validate_name("name", &request.name)?;
        validate_non_negative("price", request.price)?;
        validate_non_negative("stocks", request.stocks)?;
        if request.version <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "version".to_string(),
            }
            .into());
        }
        let category = self.resolve_category(&request.category).await?;

        let updated = self
            .products
            .update_by_id(ProductUpdate {
                id,
                name,
                price: self.currency.price(request.price),
                stock: request.stocks,
                category_id: category.id,
                updated_at: Utc::now(),
                updated_by: self.actor.clone(),
                expected_version: request.version,
            })
            .await?;

        info!(id = %updated.id, version = updated.version, "Product updated");
        Ok(Product::from(&updated))
    }

    pub async fn delete_by_id(&self, external_id: &str) -> ServiceResult<()> {
        let id = decode_id(ENTITY, external_id)?;
        self.products.delete_by_id(id, &self.actor, Utc::now()).await?;
        info!(%id, "Product deleted");
        Ok(())
    }

    /// An empty name means "no category"; an unknown name is not found.
    async fn resolve_category(&self, name: &str) -> ServiceResult<CategoryRef> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(CategoryRef {
                id: None,
                name: None,
            });
        }

        let category = self.categories.find_by_name(name).await?;
        Ok(CategoryRef {
            id: Some(category.id),
            name: Some(category.name),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
