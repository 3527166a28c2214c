//! Event structures for the matching engine
//!
//! Everything the engine sends to participants. Broadcasts reach every
//! registered mailbox in the order the engine applied the mutation; a few
//! variants are point-to-point.

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Outbound market event
///
/// Serialized as `{"type": "<camelCaseName>", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MarketEvent {
    /// An accepted order, broadcast before it is inserted
    NewOrder(Order),
    /// One match iteration
    FilledOrder(Fill),
    /// Public cancel notice, or point-to-point ack when `cancel` is set
    CancelledOrder(Cancellation),
    RoundStarted,
    RoundStopped,
    /// Point-to-point snapshot for a books request
    Books(BookSnapshot),
}

impl MarketEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            MarketEvent::NewOrder(_) => "newOrder",
            MarketEvent::FilledOrder(_) => "filledOrder",
            MarketEvent::CancelledOrder(_) => "cancelledOrder",
            MarketEvent::RoundStarted => "roundStarted",
            MarketEvent::RoundStopped => "roundStopped",
            MarketEvent::Books(_) => "books",
        }
    }
}

/// A single execution between the best bid and best ask
///
/// Both order snapshots carry their remaining quantity after this fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub sell_order: Order,
    pub buy_order: Order,
    pub quantity: Quantity,
    pub price: Price,
}

/// Cancel notice
///
/// `cancel` is absent on the public broadcast. On the point-to-point ack it
/// reports whether the order was still resting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<bool>,
}

impl Cancellation {
    pub fn public(id: OrderId) -> Self {
        Self { id, cancel: None }
    }

    pub fn ack(id: OrderId, found: bool) -> Self {
        Self {
            id,
            cancel: Some(found),
        }
    }
}

/// Both sides of the book in priority order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub sell: Vec<Order>,
    pub buy: Vec<Order>,
}
