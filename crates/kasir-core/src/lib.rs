//! # kasir-core: Pure Logic for the Kasir POS Backend
//!
//! Everything here is deterministic and free of I/O, so it can be tested
//! without a database or a server.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kasir Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/kasir-api (axum)                           │   │
//! │  │    handlers ──► services (business rules)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │   id    │ │  money  │ │  entity  │ │ period  │ │response │ │   │
//! │  │   │ base-62 │ │  Price  │ │  model   │ │ report  │ │envelope │ │   │
//! │  │   │  codec  │ │Currency │ │convert   │ │ windows │ │  etag   │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kasir-db (Persistence Layer)                    │   │
//! │  │        repository traits, SQLite + in-memory backends           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`id`] - Base-62 codec for UUIDv7 identifiers
//! - [`money`] - `Price` and `Currency`, integer minor units only
//! - [`entity`] - Records as repositories store them
//! - [`model`] - JSON models and requests, entity conversion
//! - [`period`] - Report date-window resolution
//! - [`response`] - Response envelope with etags
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod entity;
pub mod error;
pub mod id;
pub mod model;
pub mod money;
pub mod period;
pub mod response;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Price};
pub use period::{DateRange, ReportPeriod};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Actor recorded in audit fields until requests carry an authenticated
/// principal.
pub const DEFAULT_ACTOR: &str = "USER";

/// Number of entries in each report ranking.
pub const TOP_RANKING_LIMIT: usize = 5;

/// Category name reported for lines sold without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";
