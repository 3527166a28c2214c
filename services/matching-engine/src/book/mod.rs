//! Order book infrastructure module
//!
//! Contains price levels, bid book, and ask book implementations, and the
//! two-sided `OrderBook` the engine owns.

pub mod price_level;
pub mod bid_book;
pub mod ask_book;

pub use price_level::PriceLevel;
pub use bid_book::BidBook;
pub use ask_book::AskBook;

use types::ids::OrderId;
use types::numeric::Price;
use types::order::{Order, Side};

/// Both sides of the market
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub(crate) bids: BidBook,
    pub(crate) asks: AskBook,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an order on its side behind every order at the same price
    pub fn insert(&mut self, order: Order) {
        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
    }

    /// Remove an order by identity from whichever side holds it
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        self.asks.remove(order_id).or_else(|| self.bids.remove(order_id))
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.asks.contains(order_id) || self.bids.contains(order_id)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_bid_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_ask_price()
    }

    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    pub fn asks(&self) -> &AskBook {
        &self.asks
    }

    /// Drop every resting order on both sides
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }
}
