//! # Error Types
//!
//! Domain-specific error types for quotedesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  quotedesk-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  quotedesk-db errors (separate crate)                               │
//! │  └── DbError          - Persistence failures, status gating         │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → caller               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (number, id, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations in the document lifecycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced part does not exist (or is soft-deleted).
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A status change was requested that the transition table forbids.
    ///
    /// ## When This Occurs
    /// - Patching a cancelled quotation back to draft
    /// - Confirming an expired quotation
    /// - Any move out of a terminal status
    #[error("Quotation cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The quotation is locked and may only change through conversion.
    ///
    /// ## When This Occurs
    /// - Updating a quotation whose status is confirmed, invoiced or sold
    #[error("Quotation {quotation_id} is {status}, document is locked")]
    QuotationLocked {
        quotation_id: String,
        status: String,
    },

    /// No authenticated actor was supplied for a mutating operation.
    #[error("Operation requires an authenticated actor")]
    ActorRequired,

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any business logic or persistence runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A required collection is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set (enum boundary check).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A caller-supplied derived amount disagrees with the recomputed value.
    #[error("{field} mismatch: supplied {supplied}, computed {computed}")]
    AmountMismatch {
        field: String,
        supplied: i64,
        computed: i64,
    },

    /// Patch carries no fields to apply.
    #[error("patch must set at least one field")]
    EmptyPatch,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuotationLocked {
            quotation_id: "q-1".to_string(),
            status: "invoiced".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Quotation q-1 is invoiced, document is locked"
        );

        let err = CoreError::InvalidStatusTransition {
            from: "cancelled".to_string(),
            to: "draft".to_string(),
        };
        assert_eq!(err.to_string(), "Quotation cannot move from cancelled to draft");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "quotation_number".to_string(),
        };
        assert_eq!(err.to_string(), "quotation_number is required");

        let err = ValidationError::AmountMismatch {
            field: "total_cents".to_string(),
            supplied: 1000,
            computed: 1100,
        };
        assert_eq!(
            err.to_string(),
            "total_cents mismatch: supplied 1000, computed 1100"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyPatch;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
