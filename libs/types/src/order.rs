//! Order record and side
//!
//! An order's identity never changes; only the engine mutates its quantity,
//! and only downward as fills are applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::OrderError;
use crate::ids::{OrderId, ParticipantId};
use crate::numeric::{Price, Quantity};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// A resting or incoming instruction
///
/// `owner` is a routing handle only; it is never serialized and never keeps
/// the participant alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub quantity: Quantity,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    #[serde(skip)]
    pub owner: Option<ParticipantId>,
}

impl Order {
    /// Create a new order stamped with a fresh id and the current time
    pub fn new(side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            id: OrderId::new(),
            quantity,
            price,
            timestamp: Utc::now(),
            side,
            owner: None,
        }
    }

    pub fn buy(price: Price, quantity: Quantity) -> Self {
        Self::new(Side::Buy, price, quantity)
    }

    pub fn sell(price: Price, quantity: Quantity) -> Self {
        Self::new(Side::Sell, price, quantity)
    }

    /// Attach the submitting participant
    pub fn with_owner(mut self, owner: ParticipantId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    /// Value of the remaining quantity at the order's limit price
    pub fn notional(&self) -> Decimal {
        self.price.notional(self.quantity)
    }

    /// Decrement the remaining quantity by an executed amount
    pub fn fill(&mut self, executed: Quantity) -> Result<(), OrderError> {
        if executed <= 0 {
            return Err(OrderError::InvalidQuantity(executed));
        }
        if executed > self.quantity {
            return Err(OrderError::Overfill {
                fill: executed,
                remaining: self.quantity,
            });
        }
        self.quantity -= executed;
        Ok(())
    }

    /// Check if nothing remains to execute
    pub fn is_filled(&self) -> bool {
        self.quantity == 0
    }
}
