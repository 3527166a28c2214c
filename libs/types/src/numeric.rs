//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Prices are held to the cent and rounded HALF_UP on construction.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places carried by every price (cents)
pub const PRICE_DP: u32 = 2;

/// Share count. Resting orders always hold a positive quantity.
pub type Quantity = i64;

/// Largest quantity a single order may carry
pub const MAX_QUANTITY: Quantity = 1_000_000_000;

/// Largest limit price accepted for matching, in whole currency units
pub const MAX_PRICE_UNITS: u64 = 1_000_000_000_000;

/// Fixed-point currency value, two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rounding half-up to the nearest cent
    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(PRICE_DP);
        Self(rounded)
    }

    /// Create a price from a whole number of currency units
    pub fn from_u64(units: u64) -> Self {
        Self::new(Decimal::from(units))
    }

    /// Create a price from a whole number of cents
    pub fn from_cents(cents: i64) -> Self {
        Self::new(Decimal::new(cents, PRICE_DP))
    }

    /// One whole currency unit, the strategies' quoting step
    pub fn tick() -> Self {
        Self::from_u64(1)
    }

    /// Smallest representable price increment
    pub fn cent() -> Self {
        Self::from_cents(1)
    }

    /// Strictly positive and no greater than `MAX_PRICE_UNITS`.
    /// Sums and notionals of tradable prices cannot overflow.
    pub fn is_tradable(&self) -> bool {
        self.0 > Decimal::ZERO && self.0 <= Decimal::from(MAX_PRICE_UNITS)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whole number of cents. Exact, since every price carries `PRICE_DP` places.
    pub fn as_cents(&self) -> i64 {
        self.0.mantissa() as i64
    }

    /// Value of `quantity` shares at this price
    pub fn notional(&self, quantity: Quantity) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Midpoint of two prices rounded half-up to the cent
    pub fn midpoint(a: Price, b: Price) -> Price {
        Self::new((a.0 + b.0) / Decimal::from(2))
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Decimal>().map(Self::new)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price::new(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price::new(self.0 - rhs.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
