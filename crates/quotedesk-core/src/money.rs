//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Money
//! Every monetary value in the system is an integer count of the smallest
//! currency unit (cents). Floating point never touches an amount: the
//! database, the document totals and the payment accumulator all work in
//! cents, and only an external display layer converts for presentation.
//!
//! ## Usage
//! ```rust
//! use quotedesk_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.multiply_quantity(3); // $32.97
//! let discounted = line.apply_percent_discount(10); // 10% off
//! assert_eq!(discounted.cents(), 2967);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// - **i64 (signed)**: allows negative values for adjustments and deltas
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use quotedesk_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// i128 intermediate, saturating at the i64 range: an absurd unit
    /// price times a large quantity must not panic mid-request.
    ///
    /// ```rust
    /// use quotedesk_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        let product = self.0 as i128 * qty as i128;
        Money(product.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Applies a whole-percent discount (0-100) and returns the discounted
    /// amount, rounding the discount half away from zero.
    ///
    /// ```rust
    /// use quotedesk_core::money::Money;
    ///
    /// let line = Money::from_cents(10000); // $100.00
    /// assert_eq!(line.apply_percent_discount(10).cents(), 9000);
    /// assert_eq!(line.apply_percent_discount(0).cents(), 10000);
    /// ```
    pub fn apply_percent_discount(&self, percent: u8) -> Money {
        self.apply_discount_bps(percent as u32 * 100)
    }

    /// Applies a basis-point discount (1000 = 10%) and returns the
    /// discounted amount.
    ///
    /// Integer math with rounding: `(amount * bps + 5000) / 10000` is the
    /// discount, subtracted from the amount. i128 intermediate prevents
    /// overflow on large amounts.
    pub fn apply_discount_bps(&self, discount_bps: u32) -> Money {
        let discount_amount = (self.0 as i128 * discount_bps as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs; presentation formatting belongs to the caller.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.cents(), 1500);
    }

    #[test]
    fn test_percent_discount() {
        let line = Money::from_cents(10000); // $100.00
        assert_eq!(line.apply_percent_discount(10).cents(), 9000);
        assert_eq!(line.apply_percent_discount(0).cents(), 10000);
        assert_eq!(line.apply_percent_discount(100).cents(), 0);
    }

    #[test]
    fn test_discount_rounding() {
        // $0.99 at 33% = 32.67 cents discount → rounds to 33 → 66 cents left
        let line = Money::from_cents(99);
        assert_eq!(line.apply_discount_bps(3300).cents(), 66);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    #[test]
    fn test_multiply_quantity_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(i64::MAX);
        assert_eq!(huge.multiply_quantity(9_999).cents(), i64::MAX);

        let negative = Money::from_cents(i64::MIN);
        assert_eq!(negative.multiply_quantity(2).cents(), i64::MIN);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
