//! # quotedesk-db: Database Layer for QuoteDesk
//!
//! This crate provides database access for the QuoteDesk system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       QuoteDesk Data Flow                           │
//! │                                                                     │
//! │  Caller (external HTTP layer, already holding an Actor)             │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  quotedesk-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │   ┌─────────────┐   ┌────────────────┐   ┌──────────────┐    │ │
//! │  │   │  Database   │   │  Repositories  │   │  Migrations  │    │ │
//! │  │   │  (pool.rs)  │   │ quotation.rs   │   │  (embedded)  │    │ │
//! │  │   │             │   │ invoice.rs     │   │              │    │ │
//! │  │   │ SqlitePool  │◄──│ part(_item).rs │   │ 001_init.sql │    │ │
//! │  │   │             │   │ company.rs     │   │ 002_idx.sql  │    │ │
//! │  │   └─────────────┘   └────────────────┘   └──────────────┘    │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite Database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quotedesk_db::{Database, DbConfig};
//! use quotedesk_core::{Actor, NewQuotation, NewQuotationItem};
//!
//! let db = Database::new(DbConfig::new("path/to/quotedesk.db")).await?;
//!
//! let actor = Actor::new("user-1", "sales");
//! let (quotation, items) = db
//!     .quotations()
//!     .create(&actor, NewQuotation::default(), vec![
//!         NewQuotationItem::new(part.id, 2, 4_999),
//!     ])
//!     .await?;
//!
//! let invoice = db.quotations().convert_to_invoice(&actor, &quotation.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::company::CompanyRepository;
pub use repository::invoice::{InvoiceFilter, InvoiceRepository};
pub use repository::part::{PartFilter, PartRepository};
pub use repository::part_item::{PartItemFilter, PartItemRepository};
pub use repository::quotation::{QuotationFilter, QuotationRepository};
