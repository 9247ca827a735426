//! # Domain Types
//!
//! Core domain types used throughout QuoteDesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │   Quotation    │   │    Invoice     │   │    PartItem    │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  id (UUID)     │      │
//! │  │  number (biz)  │   │  number (biz)  │   │  barcode (biz) │      │
//! │  │  status        │   │  amount_paid   │   │  status        │      │
//! │  │  total_cents   │   │  due_date      │   │  condition     │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (quotation_number, invoice_number, part_number, barcode) -
//!   human-facing, unique
//!
//! ## Snapshot Pattern
//! Invoices denormalize company/customer data at conversion time so the
//! ledger stays truthful even when the company record changes later.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::money::Money;
use crate::status::{PartCondition, PartItemStatus, PaymentStatus, QuotationStatus};
use crate::{DEFAULT_PAGE_SIZE, INVOICE_DUE_DAYS, QUOTATION_VALIDITY_DAYS};

// =============================================================================
// Actor
// =============================================================================

/// The resolved identity performing an operation.
///
/// Session resolution happens outside this workspace; every mutating
/// operation receives an `Actor` explicitly instead of reading ambient
/// request state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable user id from the external session provider.
    pub id: String,
    /// Role label as resolved by the session provider.
    pub role: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Actor {
            id: id.into(),
            role: role.into(),
        }
    }
}

// =============================================================================
// Company
// =============================================================================

/// A customer or supplier company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_customer: bool,
    pub is_supplier: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes for creating a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_customer: bool,
    pub is_supplier: bool,
}

// =============================================================================
// Part
// =============================================================================

/// A catalog part definition (price and stock policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Part {
    pub id: String,

    /// Business identifier, unique across the catalog.
    pub part_number: String,

    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,

    /// Catalog price in cents.
    pub price_cents: i64,

    /// Current aggregate stock level (None when untracked).
    pub current_stock: Option<i64>,

    /// Whether aggregate stock is maintained for this part.
    pub track_inventory: bool,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Returns the catalog price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Attributes for creating a part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPart {
    pub part_number: String,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub price_cents: i64,
    pub current_stock: Option<i64>,
    pub track_inventory: bool,
}

// =============================================================================
// Part Item
// =============================================================================

/// A serialized or lot-tracked physical inventory unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PartItem {
    pub id: String,
    pub part_id: String,

    /// Unique when present.
    pub barcode: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub shelve_location: Option<String>,
    pub supplier_id: Option<String>,
    pub purchase_price_cents: Option<i64>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,

    /// Warranty length in days, non-negative.
    pub warranty_period_days: Option<i64>,

    pub condition: PartCondition,
    pub status: PartItemStatus,

    /// Back-reference set when reserved or sold against a quotation.
    pub quotation_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes for creating a part item (single or bulk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPartItem {
    pub part_id: String,
    pub barcode: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub shelve_location: Option<String>,
    pub supplier_id: Option<String>,
    pub purchase_price_cents: Option<i64>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub warranty_period_days: Option<i64>,
    pub condition: PartCondition,
    pub status: PartItemStatus,
    pub quotation_id: Option<String>,
}

impl NewPartItem {
    /// A bare item for a part, defaulting to new/available.
    pub fn for_part(part_id: impl Into<String>) -> Self {
        NewPartItem {
            part_id: part_id.into(),
            barcode: None,
            serial_number: None,
            location: None,
            shelve_location: None,
            supplier_id: None,
            purchase_price_cents: None,
            purchase_date: None,
            expiry_date: None,
            warranty_period_days: None,
            condition: PartCondition::New,
            status: PartItemStatus::Available,
            quotation_id: None,
        }
    }
}

/// Allow-listed patch for a part item.
///
/// Caller input never spreads onto a stored record: only the fields present
/// on this type can change, and status/condition pass through the typed
/// enums.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartItemPatch {
    pub status: Option<PartItemStatus>,
    pub condition: Option<PartCondition>,
    pub location: Option<String>,
    pub shelve_location: Option<String>,
    pub quotation_id: Option<String>,
}

impl PartItemPatch {
    /// True when the patch carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.condition.is_none()
            && self.location.is_none()
            && self.shelve_location.is_none()
            && self.quotation_id.is_none()
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A quotation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Quotation {
    pub id: String,

    /// Human-facing unique number, `QT-<millis><seq>` when auto-generated.
    pub quotation_number: String,

    pub company_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,

    pub status: QuotationStatus,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,

    pub valid_until: DateTime<Utc>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,

    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether the document is immutable via the update path.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }
}

/// A quotation line item.
///
/// Prices are frozen at creation; the owning quotation's totals are derived
/// from these rows and never drift from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuotationItem {
    pub id: String,
    pub quotation_id: String,
    pub part_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Whole-percent discount, 0-100.
    pub discount_percent: i64,
    pub line_total_cents: i64,
    /// Order within the quotation.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl QuotationItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// Attributes for creating a quotation.
///
/// Derived amounts (`subtotal_cents`, `total_cents`) are optional: the
/// engine recomputes them from the line items and rejects supplied values
/// that disagree rather than trusting caller arithmetic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewQuotation {
    /// Preserved verbatim when supplied, otherwise generated.
    pub quotation_number: Option<String>,
    pub company_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    /// Caller-supplied subtotal, checked against the recomputed value.
    pub subtotal_cents: Option<i64>,
    /// Caller-supplied total, checked against the recomputed value.
    pub total_cents: Option<i64>,
    /// Defaults to creation time + 30 days.
    pub valid_until: Option<DateTime<Utc>>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
}

/// Attributes for one line item of a new quotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuotationItem {
    pub part_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Whole-percent discount, 0-100.
    pub discount_percent: i64,
    /// Caller-supplied line total, checked against the recomputed value.
    pub line_total_cents: Option<i64>,
}

impl NewQuotationItem {
    pub fn new(part_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        NewQuotationItem {
            part_id: part_id.into(),
            quantity,
            unit_price_cents,
            discount_percent: 0,
            line_total_cents: None,
        }
    }

    /// Recomputes the line total: quantity × unit price, discounted.
    pub fn computed_line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
            .multiply_quantity(self.quantity)
            .apply_percent_discount(self.discount_percent.clamp(0, 100) as u8)
    }
}

/// Server-side recomputed quotation amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotationTotals {
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

impl NewQuotation {
    /// Recomputes subtotal and total from the line items:
    /// subtotal = Σ line totals; total = subtotal − discount + tax + shipping.
    pub fn computed_totals(&self, items: &[NewQuotationItem]) -> QuotationTotals {
        let subtotal: Money = items
            .iter()
            .map(NewQuotationItem::computed_line_total)
            .fold(Money::zero(), |acc, line| acc + line);

        let total = subtotal - Money::from_cents(self.discount_cents)
            + Money::from_cents(self.tax_cents)
            + Money::from_cents(self.shipping_cents);

        QuotationTotals {
            subtotal_cents: subtotal.cents(),
            total_cents: total.cents(),
        }
    }

    /// The validity deadline, defaulted when the caller left it unset.
    pub fn valid_until_or_default(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.valid_until
            .unwrap_or_else(|| now + Duration::days(QUOTATION_VALIDITY_DAYS))
    }
}

/// Process-wide sequence disambiguating documents created within the same
/// millisecond. Wraps at 1000; a collision would need a thousand documents
/// in one millisecond AND a pool restart landing on the same counter value,
/// and even then the UNIQUE constraint still catches it.
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_document_sequence() -> u64 {
    DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000
}

/// Generates a quotation number from a creation instant:
/// `QT-<millis><seq>`, still an integer after the prefix.
pub fn generate_quotation_number(now: DateTime<Utc>) -> String {
    format!(
        "QT-{}{:03}",
        now.timestamp_millis(),
        next_document_sequence()
    )
}

/// Allow-listed patch for a quotation.
///
/// Amounts and line items are deliberately absent: they are fixed at
/// creation. A status change must follow the transition table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotationPatch {
    pub company_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: Option<QuotationStatus>,
    pub valid_until: Option<DateTime<Utc>>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
}

impl QuotationPatch {
    /// True when the patch carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.company_id.is_none()
            && self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.customer_phone.is_none()
            && self.status.is_none()
            && self.valid_until.is_none()
            && self.payment_terms.is_none()
            && self.notes.is_none()
            && self.internal_notes.is_none()
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice derived from exactly one quotation at conversion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,

    /// Human-facing unique number, `INV-<millis><seq>`.
    pub invoice_number: String,

    /// Source quotation (1:1, UNIQUE at the storage level).
    pub quotation_id: String,

    // Denormalized from the quotation at conversion time.
    pub company_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,

    pub total_cents: i64,

    /// Monotonically non-decreasing payment accumulator, starts at 0.
    pub amount_paid_cents: i64,

    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,

    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Remaining balance, never negative (overpayment reads as zero due).
    pub fn balance_due(&self) -> Money {
        let due = self.total_cents - self.amount_paid_cents;
        Money::from_cents(due.max(0))
    }

    /// Derives the payment status at `now`.
    pub fn payment_status(&self, now: DateTime<Utc>) -> PaymentStatus {
        PaymentStatus::derive(self.amount_paid(), self.total(), self.due_date, now)
    }
}

/// Generates an invoice number from a conversion instant:
/// `INV-<millis><seq>`, still an integer after the prefix.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    format!(
        "INV-{}{:03}",
        now.timestamp_millis(),
        next_document_sequence()
    )
}

/// Default due date for a freshly converted invoice.
pub fn default_due_date(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(INVOICE_DUE_DAYS)
}

/// Allow-listed patch for an invoice: `{due_date, notes}` only.
///
/// Anything else a caller sends simply cannot be expressed here, which is
/// how unknown fields get dropped without being an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl InvoicePatch {
    /// True when the patch carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.due_date.is_none() && self.notes.is_none()
    }
}

/// One accepted payment against an invoice (append-only ledger row).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoicePayment {
    pub id: String,
    pub invoice_id: String,
    pub amount_cents: i64,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Pagination & Ordering
// =============================================================================

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Sort key for quotation listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationOrderBy {
    CreatedAt,
    UpdatedAt,
    TotalAmount,
    QuotationNumber,
}

impl QuotationOrderBy {
    /// The column behind the sort key. Fixed set, never caller text.
    pub const fn as_column(&self) -> &'static str {
        match self {
            QuotationOrderBy::CreatedAt => "created_at",
            QuotationOrderBy::UpdatedAt => "updated_at",
            QuotationOrderBy::TotalAmount => "total_cents",
            QuotationOrderBy::QuotationNumber => "quotation_number",
        }
    }
}

impl Default for QuotationOrderBy {
    fn default() -> Self {
        QuotationOrderBy::CreatedAt
    }
}

/// Sort key for invoice listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceOrderBy {
    CreatedAt,
    UpdatedAt,
    TotalAmount,
    DueDate,
    InvoiceNumber,
}

impl InvoiceOrderBy {
    pub const fn as_column(&self) -> &'static str {
        match self {
            InvoiceOrderBy::CreatedAt => "created_at",
            InvoiceOrderBy::UpdatedAt => "updated_at",
            InvoiceOrderBy::TotalAmount => "total_cents",
            InvoiceOrderBy::DueDate => "due_date",
            InvoiceOrderBy::InvoiceNumber => "invoice_number",
        }
    }
}

impl Default for InvoiceOrderBy {
    fn default() -> Self {
        InvoiceOrderBy::CreatedAt
    }
}

/// Page request: 1-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page, 1..=MAX_PAGE_SIZE.
    pub limit: u32,
}

impl Page {
    pub const fn new(page: u32, limit: u32) -> Self {
        Page { page, limit }
    }

    /// Row offset for the page.
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
