//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is not a number")]
    NotANumber,
    #[error("price must be strictly positive")]
    NotPositive,
    #[error("price has more than {MAX_SCALE} decimal places")]
    TooPrecise,
    #[error("price exceeds the maximum amount")]
    TooLarge,
}

/// Decimal places a price may carry.
pub const MAX_SCALE: u32 = 2;

/// Largest accepted price, 9 999 999 999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// A strictly positive amount in the marketplace currency.
///
/// Catalog prices and order line prices are always `Price`; sums that may be
/// zero (an empty cart) stay plain [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] for zero or negative amounts,
    /// [`PriceError::TooPrecise`] for fractions of a cent and
    /// [`PriceError::TooLarge`] above [`MAX_PRICE`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        // Trailing zeros do not count: 3.500 is 3.50.
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > MAX_PRICE {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a user-entered amount. Accepts `12.5` and `12,5`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] if the text is not a decimal, or
    /// [`PriceError::NotPositive`] if it is not above zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let normalized = s.trim().replace(',', ".");
        let amount: Decimal = normalized.parse().map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount for `quantity` units.
    ///
    /// Cannot overflow: `MAX_PRICE * u32::MAX` is about 4.3e19, far below
    /// `Decimal::MAX` (7.9e28).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Two-decimal display, e.g. `$12.50`.
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

/// Format any amount the way prices are shown across the site.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("-3"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_parse_accepts_comma() {
        assert_eq!(Price::parse("12,5").unwrap().amount(), Decimal::new(125, 1));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Price::parse("douze"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse(""), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::parse("3").unwrap().to_string(), "$3.00");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "$12.35");
    }

    #[test]
    fn test_rejects_fractions_of_a_cent() {
        assert_eq!(Price::parse("0.001"), Err(PriceError::TooPrecise));
        assert_eq!(Price::parse("3.755"), Err(PriceError::TooPrecise));
        assert_eq!(Price::parse("3.500").unwrap().amount(), Decimal::new(35, 1));
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(Price::parse("9999999999.99").unwrap().amount(), MAX_PRICE);
        assert_eq!(Price::parse("10000000000"), Err(PriceError::TooLarge));
        assert_eq!(
            Price::parse("1000000000000000000000000000"),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_times_at_bounds() {
        let max = Price::new(MAX_PRICE).unwrap();
        assert_eq!(max.times(99), MAX_PRICE * Decimal::from(99));
        assert!(max.times(u32::MAX) > Decimal::ZERO);
    }

    #[test]
    fn test_times() {
        let price = Price::parse("2.50").unwrap();
        assert_eq!(price.times(3), Decimal::new(750, 2));
    }
}
