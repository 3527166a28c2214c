//! Participant-local order book mirror
//!
//! Rebuilt purely from engine broadcasts:
//! - `NewOrder` → add the order to its side
//! - `FilledOrder` → reduce both legs by the executed quantity
//! - `CancelledOrder` → drop the order
//! - `Books` → replace everything with the snapshot
//!
//! Not authoritative. It can briefly disagree with the engine, which is
//! acceptable for quoting decisions.

use std::collections::{BTreeMap, HashMap};

use matching_engine::{BookSnapshot, Fill};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// Tracks an individual order resting on the mirror.
#[derive(Debug, Clone, Copy)]
struct RestingOrder {
    side: Side,
    price: Price,
    quantity: Quantity,
}

/// Aggregated price levels plus the orders that make them up
#[derive(Debug, Clone, Default)]
pub struct ShadowBook {
    /// Bid levels: price → quantity (reversed for best-bid-first)
    bids: BTreeMap<Price, Quantity>,
    /// Ask levels: price → quantity (ascending = best ask first)
    asks: BTreeMap<Price, Quantity>,
    orders: HashMap<OrderId, RestingOrder>,
}

impl ShadowBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_order(&mut self, order: &Order) {
        if order.quantity <= 0 || self.orders.contains_key(&order.id) {
            return;
        }
        *self.levels_mut(order.side).entry(order.price).or_insert(0) += order.quantity;
        self.orders.insert(
            order.id,
            RestingOrder {
                side: order.side,
                price: order.price,
                quantity: order.quantity,
            },
        );
    }

    pub fn filled(&mut self, fill: &Fill) {
        self.reduce(&fill.sell_order.id, fill.quantity);
        self.reduce(&fill.buy_order.id, fill.quantity);
    }

    pub fn cancelled(&mut self, id: &OrderId) {
        if let Some(resting) = self.orders.get(id).copied() {
            self.reduce(id, resting.quantity);
        }
    }

    /// Replace the mirror with an authoritative snapshot
    pub fn load(&mut self, snapshot: &BookSnapshot) {
        self.clear();
        for order in snapshot.sell.iter().chain(snapshot.buy.iter()) {
            self.new_order(order);
        }
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Quantity resting at a price on one side
    pub fn depth_at(&self, side: Side, price: Price) -> Quantity {
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels.get(&price).copied().unwrap_or(0)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<Price, Quantity> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn reduce(&mut self, id: &OrderId, quantity: Quantity) {
        let Some(resting) = self.orders.get_mut(id) else {
            return;
        };
        let executed = quantity.min(resting.quantity);
        resting.quantity -= executed;
        let RestingOrder { side, price, quantity: remaining } = *resting;
        if remaining <= 0 {
            self.orders.remove(id);
        }

        let levels = self.levels_mut(side);
        if let Some(level) = levels.get_mut(&price) {
            *level -= executed;
            // Compress empty levels
            if *level <= 0 {
                levels.remove(&price);
            }
        }
    }
}
