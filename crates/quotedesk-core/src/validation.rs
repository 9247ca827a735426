//! # Validation Module
//!
//! Input validation for QuoteDesk.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: External boundary (HTTP surface, out of scope)            │
//! │  └── Shape/type checks, deserialization                             │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │  └── Runs before any persistence call                               │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  ├── UNIQUE constraints                                             │
//! │  └── Foreign key constraints                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewPartItem, NewQuotation, NewQuotationItem, Page, QuotationTotals};
use crate::{MAX_BULK_ITEMS, MAX_ITEM_QUANTITY, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a business document/part number (quotation number, part number).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_reference_number(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    // Counted in characters, not bytes: the charset below admits
    // non-ASCII alphanumerics.
    if value.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (company name, part name).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a free-text search query.
///
/// Can be empty (no text filter); at most 100 characters. Returns the
/// trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity: positive, capped.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (unit price, payment).
pub fn validate_positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that must not be negative (tax, discount, shipping).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a whole-percent discount, 0-100.
pub fn validate_discount_percent(percent: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a warranty period in days, non-negative.
pub fn validate_warranty_days(days: i64) -> ValidationResult<()> {
    if days < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "warranty_period_days".to_string(),
        });
    }

    Ok(())
}

/// Validates a page request: page ≥ 1, limit 1..=MAX_PAGE_SIZE.
pub fn validate_page(page: &Page) -> ValidationResult<()> {
    if page.page < 1 {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    if page.limit < 1 || page.limit > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates a new quotation with its items and recomputes derived amounts.
///
/// ## Checks
/// - items must be non-empty
/// - per item: positive quantity (capped), positive unit price, discount
///   0-100, recomputed line total positive
/// - caller-supplied line totals / subtotal / total must match recomputation
/// - tax/discount/shipping non-negative
/// - recomputed subtotal and total must be positive
///
/// Returns the recomputed totals to be persisted.
pub fn validate_new_quotation(
    draft: &NewQuotation,
    items: &[NewQuotationItem],
) -> ValidationResult<QuotationTotals> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if let Some(number) = &draft.quotation_number {
        validate_reference_number("quotation_number", number)?;
    }

    validate_non_negative_cents("tax_cents", draft.tax_cents)?;
    validate_non_negative_cents("discount_cents", draft.discount_cents)?;
    validate_non_negative_cents("shipping_cents", draft.shipping_cents)?;

    for item in items {
        validate_quantity(item.quantity)?;
        validate_positive_cents("unit_price_cents", item.unit_price_cents)?;
        validate_discount_percent(item.discount_percent)?;

        let computed = item.computed_line_total().cents();
        if computed <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "line_total_cents".to_string(),
            });
        }
        if let Some(supplied) = item.line_total_cents {
            if supplied != computed {
                return Err(ValidationError::AmountMismatch {
                    field: "line_total_cents".to_string(),
                    supplied,
                    computed,
                });
            }
        }
    }

    let totals = draft.computed_totals(items);

    if totals.subtotal_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "subtotal_cents".to_string(),
        });
    }
    if totals.total_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "total_cents".to_string(),
        });
    }

    if let Some(supplied) = draft.subtotal_cents {
        if supplied != totals.subtotal_cents {
            return Err(ValidationError::AmountMismatch {
                field: "subtotal_cents".to_string(),
                supplied,
                computed: totals.subtotal_cents,
            });
        }
    }
    if let Some(supplied) = draft.total_cents {
        if supplied != totals.total_cents {
            return Err(ValidationError::AmountMismatch {
                field: "total_cents".to_string(),
                supplied,
                computed: totals.total_cents,
            });
        }
    }

    Ok(totals)
}

/// Validates a single new part item.
pub fn validate_new_part_item(item: &NewPartItem) -> ValidationResult<()> {
    if item.part_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "part_id".to_string(),
        });
    }

    if let Some(barcode) = &item.barcode {
        validate_reference_number("barcode", barcode)?;
    }

    if let Some(price) = item.purchase_price_cents {
        validate_non_negative_cents("purchase_price_cents", price)?;
    }

    if let Some(days) = item.warranty_period_days {
        validate_warranty_days(days)?;
    }

    Ok(())
}

/// Validates a bulk part-item batch before any row is written.
///
/// The whole batch must be well-formed up front: size 1..=MAX_BULK_ITEMS
/// and every item individually valid.
pub fn validate_part_item_batch(items: &[NewPartItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_BULK_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BULK_ITEMS as i64,
        });
    }

    for item in items {
        validate_new_part_item(item)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewQuotation {
        NewQuotation::default()
    }

    fn item(quantity: i64, unit_price_cents: i64) -> NewQuotationItem {
        NewQuotationItem::new("part-1", quantity, unit_price_cents)
    }

    #[test]
    fn test_validate_reference_number() {
        assert!(validate_reference_number("part_number", "BRK-PAD-330").is_ok());
        assert!(validate_reference_number("part_number", "QT_2026_001").is_ok());

        assert!(validate_reference_number("part_number", "").is_err());
        assert!(validate_reference_number("part_number", "   ").is_err());
        assert!(validate_reference_number("part_number", "has space").is_err());
        assert!(validate_reference_number("part_number", &"A".repeat(100)).is_err());
    }

    #[test]
    fn test_reference_number_length_counts_characters() {
        // 50 two-byte alphanumerics: 100 bytes but exactly 50 characters.
        let umlauts = "Ä".repeat(50);
        assert!(validate_reference_number("part_number", &umlauts).is_ok());
        assert!(validate_reference_number("part_number", &"Ä".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9_999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(0).is_ok());
        assert!(validate_discount_percent(100).is_ok());
        assert!(validate_discount_percent(-1).is_err());
        assert!(validate_discount_percent(101).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(&Page::default()).is_ok());
        assert!(validate_page(&Page::new(1, 100)).is_ok());

        assert!(validate_page(&Page::new(0, 20)).is_err());
        assert!(validate_page(&Page::new(1, 0)).is_err());
        assert!(validate_page(&Page::new(1, 101)).is_err());
    }

    #[test]
    fn test_new_quotation_requires_items() {
        let err = validate_new_quotation(&draft(), &[]).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn test_new_quotation_recomputes_totals() {
        let totals = validate_new_quotation(&draft(), &[item(2, 500), item(1, 1000)]).unwrap();
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(totals.total_cents, 2000);
    }

    #[test]
    fn test_new_quotation_rejects_mismatched_totals() {
        let q = NewQuotation {
            total_cents: Some(999),
            ..Default::default()
        };
        let err = validate_new_quotation(&q, &[item(1, 1000)]).unwrap_err();
        assert!(matches!(err, ValidationError::AmountMismatch { .. }));
    }

    #[test]
    fn test_new_quotation_accepts_matching_supplied_totals() {
        let q = NewQuotation {
            subtotal_cents: Some(1000),
            total_cents: Some(1000),
            ..Default::default()
        };
        assert!(validate_new_quotation(&q, &[item(1, 1000)]).is_ok());
    }

    #[test]
    fn test_new_quotation_rejects_bad_items() {
        assert!(validate_new_quotation(&draft(), &[item(0, 1000)]).is_err());
        assert!(validate_new_quotation(&draft(), &[item(1, 0)]).is_err());

        let mut full_discount = item(1, 1000);
        full_discount.discount_percent = 100;
        // 100% discount makes the line total zero, which is not positive
        assert!(validate_new_quotation(&draft(), &[full_discount]).is_err());
    }

    #[test]
    fn test_part_item_batch_limits() {
        let one = vec![NewPartItem::for_part("part-1")];
        assert!(validate_part_item_batch(&one).is_ok());

        assert!(validate_part_item_batch(&[]).is_err());

        let too_many: Vec<_> = (0..101).map(|_| NewPartItem::for_part("part-1")).collect();
        assert!(validate_part_item_batch(&too_many).is_err());
    }

    #[test]
    fn test_part_item_batch_rejects_one_bad_item() {
        let mut items: Vec<_> = (0..3).map(|_| NewPartItem::for_part("part-1")).collect();
        items[1].warranty_period_days = Some(-5);
        assert!(validate_part_item_batch(&items).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
