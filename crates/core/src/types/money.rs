//! Money arithmetic in currency minor units.
//!
//! Catalog prices are stored as `NUMERIC(10,2)` and surfaced as
//! [`rust_decimal::Decimal`]; checkout math happens here in integer cents so
//! that totals and discounts round deterministically.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors from money conversion or arithmetic.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Negative amounts are not representable.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount does not fit in 64-bit cents.
    #[error("amount out of range")]
    OutOfRange,
}

/// A non-negative USD amount in integer cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(0);

    /// Create from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative input.
    pub const fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Self(cents))
    }

    /// Create from a decimal amount in major units (dollars), rounding
    /// half-up to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or overflows 64-bit cents.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }

        let cents = (amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(MoneyError::OutOfRange)?;

        Ok(Self(cents))
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// The amount in major units (dollars) as a decimal.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiply by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::OutOfRange`] on overflow.
    pub fn checked_mul(&self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(MoneyError::OutOfRange)
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::OutOfRange`] on overflow.
    pub fn checked_add(&self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::OutOfRange)
    }

    /// Apply a percentage discount, rounding the discount half-up to the
    /// nearest cent. Percentages above 100 clamp to a free total.
    #[must_use]
    pub fn discounted_by(&self, percent: u8) -> Self {
        let percent = i128::from(percent.min(100));
        // Half-up on a non-negative quantity: add half the divisor first.
        #[allow(clippy::cast_possible_truncation)]
        let discount = ((i128::from(self.0) * percent + 50) / 100) as i64;
        Self((self.0 - discount).max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_decimal())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_decimal_exact() {
        assert_eq!(Money::from_decimal(dec("19.99")).unwrap().cents(), 1999);
        assert_eq!(Money::from_decimal(dec("0")).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec("10.005")).unwrap().cents(), 1001);
        assert_eq!(Money::from_decimal(dec("10.004")).unwrap().cents(), 1000);
    }

    #[test]
    fn test_from_decimal_rejects_negative() {
        assert_eq!(Money::from_decimal(dec("-1.00")), Err(MoneyError::Negative));
    }

    #[test]
    fn test_line_total() {
        let unit = Money::from_decimal(dec("19.99")).unwrap();
        assert_eq!(unit.checked_mul(3).unwrap().cents(), 5997);
    }

    #[test]
    fn test_discount_rounds_half_up() {
        // 10% of $9.99 is 99.9 cents, which rounds to 100.
        let total = Money::from_cents(999).unwrap();
        assert_eq!(total.discounted_by(10).cents(), 899);
    }

    #[test]
    fn test_discount_clamps() {
        let total = Money::from_cents(500).unwrap();
        assert_eq!(total.discounted_by(100), Money::ZERO);
        assert_eq!(total.discounted_by(200), Money::ZERO);
        assert_eq!(total.discounted_by(0), total);
    }

    #[test]
    fn test_checkout_total_with_coupon() {
        // 2 x $49.99 + 1 x $100.05, 15% off.
        let a = Money::from_decimal(dec("49.99")).unwrap();
        let b = Money::from_decimal(dec("100.05")).unwrap();
        let total = a
            .checked_mul(2)
            .unwrap()
            .checked_add(b.checked_mul(1).unwrap())
            .unwrap();
        assert_eq!(total.cents(), 20_003);
        // 15% of 20003 = 3000.45 -> 3000
        assert_eq!(total.discounted_by(15).cents(), 17_003);
    }

    #[test]
    fn test_to_decimal_and_display() {
        let m = Money::from_cents(1234).unwrap();
        assert_eq!(m.to_decimal().to_string(), "12.34");
        assert_eq!(m.to_string(), "$12.34");
    }
}
