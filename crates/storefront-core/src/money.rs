//! # Money
//!
//! Prices and totals are whole cents in an `i64`. Floats appear only at
//! the HTTP boundary, converted once on the way in and once on the way out.
//!
//! ```text
//! "price": 29.99 ──► from_decimal ──► Money(2999)
//!                                       │ × quantity, Σ lines
//!                                       ▼
//! "total_amount": 59.98 ◄── as_decimal ── Money(5998)
//! ```
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_decimal(29.99).unwrap();
//! assert_eq!(price.checked_mul(2).unwrap().cents(), 5998);
//! ```
//!
//! Arithmetic is checked only: an overflowing total is an input error,
//! never a panic or a wrapped negative amount.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► OrderLineItem.unit_price_cents ──► line total
///                                                               │
///                                    Order.total_cents ◄── sum ─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Wraps a cent amount as stored in the database.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount from the wire into cents.
    ///
    /// Rounds half away from zero to the nearest cent, so binary
    /// representation noise (`29.99 * 100 = 2998.9999…`) lands on the
    /// intended value. Returns `None` for NaN, infinities and amounts
    /// that do not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(29.99).unwrap().cents(), 2999);
    /// assert_eq!(Money::from_decimal(5.0).unwrap().cents(), 500);
    /// assert!(Money::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }

        let cents = (amount * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Returns the amount as a decimal number for JSON output.
    ///
    /// ## Note
    /// Display only. Never feed the result back into arithmetic.
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Raw cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Sum of two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Unit price times quantity, `None` on overflow.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `$12.34` style, for log lines. The HTTP layer emits
/// [`Money::as_decimal`] instead.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
