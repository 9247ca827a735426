//! # Document Status Machine
//!
//! Status enums for quotations, invoices and inventory units, plus the one
//! explicit transition table in the system.
//!
//! ## Quotation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Quotation Status Machine                          │
//! │                                                                     │
//! │  draft ──(submit)──► pending ──(approve)──► confirmed               │
//! │    │                    │                       │                   │
//! │    │                    │                  (convert)                │
//! │    ├──(convert)─────────┼──────────────────────►│                   │
//! │    │                    │                       ▼                   │
//! │    ├──(cancel)──► cancelled [terminal]      invoiced [terminal]     │
//! │    │                    ▲                                           │
//! │    └──(timeout)──► expired [terminal]                               │
//! │                                                                     │
//! │  'sold' is a legacy terminal label accepted in storage but never    │
//! │  produced by the engine; conversion lands on 'invoiced'.            │
//! │                                                                     │
//! │  Locked (immutable via update): confirmed, invoiced, sold           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pre-terminal transitions (submit/approve/cancel/expire) are settable via
//! the update path; only conversion may reach `invoiced`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Quotation Status
// =============================================================================

/// The status of a quotation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Freshly created, fully editable.
    Draft,
    /// Submitted and awaiting approval.
    Pending,
    /// Approved; document is locked, only conversion may follow.
    Confirmed,
    /// Withdrawn before conversion.
    Cancelled,
    /// Validity window elapsed before conversion.
    Expired,
    /// Converted into an invoice.
    Invoiced,
    /// Legacy terminal label for a fulfilled conversion.
    Sold,
}

impl QuotationStatus {
    /// All recognised status labels, in lifecycle order.
    pub const ALL: [QuotationStatus; 7] = [
        QuotationStatus::Draft,
        QuotationStatus::Pending,
        QuotationStatus::Confirmed,
        QuotationStatus::Cancelled,
        QuotationStatus::Expired,
        QuotationStatus::Invoiced,
        QuotationStatus::Sold,
    ];

    /// Returns the canonical storage label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Pending => "pending",
            QuotationStatus::Confirmed => "confirmed",
            QuotationStatus::Cancelled => "cancelled",
            QuotationStatus::Expired => "expired",
            QuotationStatus::Invoiced => "invoiced",
            QuotationStatus::Sold => "sold",
        }
    }

    /// A terminal status has no outgoing transitions at all.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuotationStatus::Cancelled
                | QuotationStatus::Expired
                | QuotationStatus::Invoiced
                | QuotationStatus::Sold
        )
    }

    /// A locked quotation is immutable except through the conversion path.
    pub const fn is_locked(&self) -> bool {
        matches!(
            self,
            QuotationStatus::Confirmed | QuotationStatus::Invoiced | QuotationStatus::Sold
        )
    }

    /// Whether the conversion operation may run from this status.
    pub const fn is_convertible(&self) -> bool {
        matches!(
            self,
            QuotationStatus::Draft | QuotationStatus::Pending | QuotationStatus::Confirmed
        )
    }

    /// The transition table for update-path status changes.
    ///
    /// `Invoiced` is reachable exclusively through conversion, so it is
    /// never a valid target here. Terminal statuses have no exits.
    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::*;

        if *self == next {
            return false;
        }

        match self {
            Draft => matches!(next, Pending | Confirmed | Cancelled | Expired),
            Pending => matches!(next, Confirmed | Cancelled | Expired),
            Confirmed => false,
            Cancelled | Expired | Invoiced | Sold => false,
        }
    }
}

impl Default for QuotationStatus {
    fn default() -> Self {
        QuotationStatus::Draft
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuotationStatus::Draft),
            "pending" => Ok(QuotationStatus::Pending),
            "confirmed" => Ok(QuotationStatus::Confirmed),
            "cancelled" => Ok(QuotationStatus::Cancelled),
            "expired" => Ok(QuotationStatus::Expired),
            "invoiced" => Ok(QuotationStatus::Invoiced),
            "sold" => Ok(QuotationStatus::Sold),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: Self::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Derived payment state of an invoice.
///
/// Never stored: always computed from the amount paid, the invoice total
/// and the due date at the moment of observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid, not past due.
    Pending,
    /// Partially paid, not past due.
    Partial,
    /// Paid in full (or over).
    Paid,
    /// Unpaid or partially paid past the due date.
    Overdue,
}

impl PaymentStatus {
    /// Returns the canonical label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// Derives the payment status of an invoice at `now`.
    ///
    /// - `Paid` when amount_paid ≥ total (overpayment also lands here)
    /// - `Overdue` when unpaid/partial and past the due date
    /// - `Partial` when 0 < amount_paid < total
    /// - `Pending` when amount_paid = 0
    pub fn derive(
        amount_paid: Money,
        total: Money,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PaymentStatus {
        if amount_paid >= total {
            return PaymentStatus::Paid;
        }
        if now > due_date {
            return PaymentStatus::Overdue;
        }
        if amount_paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "partial".to_string(),
                    "paid".to_string(),
                    "overdue".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Part Item Status & Condition
// =============================================================================

/// Inventory state of a serialized/lot part item.
///
/// Transitions are caller-driven; the type boundary guarantees only that
/// unrecognised labels never reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PartItemStatus {
    Available,
    Sold,
    Damaged,
    Reserved,
}

impl PartItemStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PartItemStatus::Available => "available",
            PartItemStatus::Sold => "sold",
            PartItemStatus::Damaged => "damaged",
            PartItemStatus::Reserved => "reserved",
        }
    }
}

impl Default for PartItemStatus {
    fn default() -> Self {
        PartItemStatus::Available
    }
}

impl FromStr for PartItemStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(PartItemStatus::Available),
            "sold" => Ok(PartItemStatus::Sold),
            "damaged" => Ok(PartItemStatus::Damaged),
            "reserved" => Ok(PartItemStatus::Reserved),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "available".to_string(),
                    "sold".to_string(),
                    "damaged".to_string(),
                    "reserved".to_string(),
                ],
            }),
        }
    }
}

/// Physical condition of a part item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PartCondition {
    New,
    Refurbished,
    Used,
}

impl PartCondition {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PartCondition::New => "new",
            PartCondition::Refurbished => "refurbished",
            PartCondition::Used => "used",
        }
    }
}

impl Default for PartCondition {
    fn default() -> Self {
        PartCondition::New
    }
}

impl FromStr for PartCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(PartCondition::New),
            "refurbished" => Ok(PartCondition::Refurbished),
            "used" => Ok(PartCondition::Used),
            _ => Err(ValidationError::NotAllowed {
                field: "condition".to_string(),
                allowed: vec![
                    "new".to_string(),
                    "refurbished".to_string(),
                    "used".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_default_status_is_draft() {
        assert_eq!(QuotationStatus::default(), QuotationStatus::Draft);
    }

    #[test]
    fn test_locked_statuses() {
        assert!(QuotationStatus::Confirmed.is_locked());
        assert!(QuotationStatus::Invoiced.is_locked());
        assert!(QuotationStatus::Sold.is_locked());

        assert!(!QuotationStatus::Draft.is_locked());
        assert!(!QuotationStatus::Pending.is_locked());
        assert!(!QuotationStatus::Cancelled.is_locked());
    }

    #[test]
    fn test_transition_table() {
        use QuotationStatus::*;

        assert!(Draft.can_transition_to(Pending));
        assert!(Draft.can_transition_to(Confirmed));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Draft.can_transition_to(Expired));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));

        // Invoiced is reachable only through conversion
        assert!(!Draft.can_transition_to(Invoiced));
        assert!(!Pending.can_transition_to(Invoiced));
        assert!(!Confirmed.can_transition_to(Invoiced));

        // No exits from terminals, no backwards moves
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Expired.can_transition_to(Pending));
        assert!(!Invoiced.can_transition_to(Draft));
        assert!(!Sold.can_transition_to(Draft));
        assert!(!Pending.can_transition_to(Draft));
        assert!(!Confirmed.can_transition_to(Pending));

        // Self-transitions are not transitions
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn test_convertible_statuses() {
        assert!(QuotationStatus::Draft.is_convertible());
        assert!(QuotationStatus::Pending.is_convertible());
        assert!(QuotationStatus::Confirmed.is_convertible());

        assert!(!QuotationStatus::Cancelled.is_convertible());
        assert!(!QuotationStatus::Expired.is_convertible());
        assert!(!QuotationStatus::Invoiced.is_convertible());
        assert!(!QuotationStatus::Sold.is_convertible());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in QuotationStatus::ALL {
            assert_eq!(status.as_str().parse::<QuotationStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<QuotationStatus>().is_err());
    }

    #[test]
    fn test_part_item_enum_boundaries() {
        assert_eq!(
            "reserved".parse::<PartItemStatus>().unwrap(),
            PartItemStatus::Reserved
        );
        assert!("broken".parse::<PartItemStatus>().is_err());

        assert_eq!(
            "refurbished".parse::<PartCondition>().unwrap(),
            PartCondition::Refurbished
        );
        assert!("mint".parse::<PartCondition>().is_err());
    }

    #[test]
    fn test_payment_status_derivation() {
        let now = Utc::now();
        let future = now + Duration::days(10);
        let past = now - Duration::days(10);
        let total = Money::from_cents(10_000); // $100.00

        // amount_paid = 0, due in the future → pending
        assert_eq!(
            PaymentStatus::derive(Money::zero(), total, future, now),
            PaymentStatus::Pending
        );

        // 0 < amount_paid < total → partial
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(4_000), total, future, now),
            PaymentStatus::Partial
        );

        // amount_paid = total → paid
        assert_eq!(
            PaymentStatus::derive(total, total, future, now),
            PaymentStatus::Paid
        );

        // overpaid still reads paid
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(12_000), total, future, now),
            PaymentStatus::Paid
        );

        // amount_paid = 0, past due → overdue
        assert_eq!(
            PaymentStatus::derive(Money::zero(), total, past, now),
            PaymentStatus::Overdue
        );

        // partial past due → overdue
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(4_000), total, past, now),
            PaymentStatus::Overdue
        );

        // fully paid past due stays paid
        assert_eq!(
            PaymentStatus::derive(total, total, past, now),
            PaymentStatus::Paid
        );
    }
}
