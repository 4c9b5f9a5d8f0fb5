//! # Service Layer
//!
//! Business rules between the HTTP handlers and the repositories.
//!
//! ```text
//! handler ──► CategoryService    ──► CategoryRepository
//!         ──► ProductService     ──► ProductRepository + CategoryRepository
//!         ──► TransactionService ──► TransactionRepository + ProductRepository
//! ```
//!
//! Services speak external ids (base-62) and external models; repositories
//! speak UUIDs and entities.

use uuid::Uuid;

use kasir_core::{id, CoreError};
use kasir_db::DbError;

pub mod category_service;
pub mod product_service;
pub mod transaction_service;

pub use category_service::CategoryService;
pub use product_service::ProductService;
pub use transaction_service::TransactionService;

/// Failure of a service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<kasir_core::ValidationError> for ServiceError {
    fn from(err: kasir_core::ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Decodes an external id, reporting failures against `entity`.
pub(crate) fn decode_id(entity: &str, external: &str) -> Result<Uuid, CoreError> {
    id::decode(external).map_err(|source| CoreError::invalid_id(entity, external, source))
}
