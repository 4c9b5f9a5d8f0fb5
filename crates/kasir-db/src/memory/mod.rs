//! # In-Memory Backend
//!
//! Process-local implementations of the repository traits, for tests and
//! for running the server without a database file.
//!
//! ## Shared State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore                                                            │
//! │    Arc<RwLock<MemoryState>>                                             │
//! │       │                                                                 │
//! │       ├── MemoryCategoryRepository ─┐                                   │
//! │       ├── MemoryProductRepository  ─┼── clones of the same Arc          │
//! │       └── MemoryTransactionRepository┘                                  │
//! │                                                                         │
//! │  Product reads see category renames; a sale decrements the same        │
//! │  product records the product repository serves.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are keyed by UUID in `BTreeMap`s, so iteration follows ID order
//! the same way the SQLite backend's `ORDER BY id` does. Deleting removes the
//! record outright; there is no soft-delete state here.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use kasir_core::entity::{CategoryEntity, ProductEntity, TransactionDetailEntity, TransactionEntity};

mod category;
mod product;
mod transaction;

pub use category::MemoryCategoryRepository;
pub use product::MemoryProductRepository;
pub use transaction::MemoryTransactionRepository;

/// Everything the in-memory backend holds.
#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) categories: BTreeMap<Uuid, CategoryEntity>,
    pub(crate) products: BTreeMap<Uuid, ProductEntity>,
    pub(crate) transactions: Vec<TransactionEntity>,
    pub(crate) details: Vec<TransactionDetailEntity>,
}

impl MemoryState {
    /// A product as readers see it, with its category name resolved.
    pub(crate) fn resolved_product(&self, product: &ProductEntity) -> ProductEntity {
        let mut product = product.clone();
        product.category_name = product
            .category_id
            .and_then(|id| self.categories.get(&id))
            .map(|c| c.name.clone());
        product
    }
}

/// Handle to one in-memory store. Cheap to clone.
///
/// ## Usage
/// ```rust,ignore
/// let store = MemoryStore::new();
/// let categories = store.categories();
/// let products = store.products(); // same data as `categories`
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a category repository over this store.
    pub fn categories(&self) -> MemoryCategoryRepository {
        MemoryCategoryRepository::new(Arc::clone(&self.state))
    }

    /// Returns a product repository over this store.
    pub fn products(&self) -> MemoryProductRepository {
        MemoryProductRepository::new(Arc::clone(&self.state))
    }

    /// Returns a transaction repository over this store.
    pub fn transactions(&self) -> MemoryTransactionRepository {
        MemoryTransactionRepository::new(Arc::clone(&self.state))
    }
}
