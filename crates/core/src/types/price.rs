//! Type-safe price representation using decimal arithmetic.
//!
//! The shop prices everything in a single currency, so a `Price` is just an
//! amount in the currency's standard unit. The backend sends amounts as JSON
//! numbers; strings are accepted too.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in the shop's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Take a whole-number percentage of this price, rounded to a whole unit.
    ///
    /// Halves round away from zero.
    #[must_use]
    pub fn percent_rounded(self, percent: u32) -> Self {
        let raw = self.0 * Decimal::from(percent) / Decimal::ONE_HUNDRED;
        Self(raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Format for display with two decimal places (e.g., "12.50").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
