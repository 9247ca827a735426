//! # Repository Module
//!
//! Database repository implementations for QuoteDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repository Pattern                                │
//! │                                                                         │
//! │  Caller (holding an Actor from the external session layer)              │
//! │       │                                                                 │
//! │       │  db.quotations().convert_to_invoice(&actor, id)                 │
//! │       ▼                                                                 │
//! │  QuotationRepository                                                    │
//! │  ├── create(&self, actor, draft, items)                                 │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── list(&self, filter, page)                                          │
//! │  ├── update(&self, actor, id, patch)                                    │
//! │  └── convert_to_invoice(&self, actor, id)                               │
//! │       │                                                                 │
//! │       │  SQL (transactions, conditional UPDATEs)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation runs first, per call; mutation guards live in the WHERE
//! clause of the write itself so concurrent callers race safely.
//!
//! ## Available Repositories
//!
//! - [`company::CompanyRepository`] - Customer/supplier directory
//! - [`part::PartRepository`] - Part catalog CRUD and search
//! - [`part_item::PartItemRepository`] - Serialized inventory units
//! - [`quotation::QuotationRepository`] - Quotation lifecycle and conversion
//! - [`invoice::InvoiceRepository`] - Invoice ledger and payments

pub mod company;
pub mod invoice;
pub mod part;
pub mod part_item;
pub mod quotation;
