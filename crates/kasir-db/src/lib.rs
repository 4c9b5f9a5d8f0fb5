//! # kasir-db: Persistence Layer for Kasir
//!
//! Repository contracts for categories, products and transactions, with a
//! SQLite backend (sqlx) and an in-memory backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler → service (kasir-api)                                    │
//! │       │  Arc<dyn ProductRepository>                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  repository   │    │   memory     │  │   │
//! │  │   │   (pool.rs)   │◄───│  traits +     │───►│  MemoryStore │  │   │
//! │  │   │  SqlitePool   │    │  Sqlite*Repo  │    │  (RwLock)    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           ▼                                                     │   │
//! │  │   migrations (embedded 001_initial_schema.sql)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig, Repositories};
//!
//! let db = Database::new(DbConfig::new("kasir.db")).await?;
//! let repos = Repositories::sqlite(&db);
//! let categories = repos.categories.find_all().await?;
//!
//! // Or without a database file
//! let repos = Repositories::in_memory();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use repository::{
    CategoryRepository, ProductRepository, Repositories, TransactionRepository,
};
