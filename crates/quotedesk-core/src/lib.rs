//! # quotedesk-core: Pure Business Logic for QuoteDesk
//!
//! This crate is the **heart** of QuoteDesk. It contains the quotation and
//! invoice document rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      QuoteDesk Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │        External collaborators (out of this workspace)         │ │
//! │  │   HTTP surface ──► session resolver ──► Actor { id, role }    │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │             ★ quotedesk-core (THIS CRATE) ★                   │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────┐        │ │
//! │  │   │  types  │ │  money  │ │  status  │ │ validation │        │ │
//! │  │   │ Quote   │ │  Money  │ │ machine  │ │   rules    │        │ │
//! │  │   │ Invoice │ │  cents  │ │ payment  │ │   checks   │        │ │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────┘        │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                quotedesk-db (Database Layer)                  │ │
//! │  │          SQLite queries, migrations, repositories             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Quotation, Invoice, Part, PartItem, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`status`] - Document status enums and the transition table
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//! 5. **Explicit Actors**: identity is passed in, never read from ambient
//!    request state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use status::{PartCondition, PartItemStatus, PaymentStatus, QuotationStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of part items accepted by a single bulk insert.
pub const MAX_BULK_ITEMS: usize = 100;

/// Maximum quantity of a single quotation line item.
///
/// Prevents accidental over-ordering (e.g. typing 10000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Days a quotation stays valid when `valid_until` is not supplied.
pub const QUOTATION_VALIDITY_DAYS: i64 = 30;

/// Days until an invoice is due when converted from a quotation.
pub const INVOICE_DUE_DAYS: i64 = 30;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;
