//! Ask (sell-side) order book
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::{BTreeMap, HashMap};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Ask (sell) side order book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
/// At each price level, orders are maintained in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first)
    levels: BTreeMap<Price, PriceLevel>,
    /// Resting order → price level, for removal by identity
    index: HashMap<OrderId, Price>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order into the ask book
    pub fn insert(&mut self, order: Order) {
        self.index.insert(order.id, order.price);
        self.levels.entry(order.price).or_default().insert(order);
    }

    /// Remove an order from the ask book
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let price = self.index.remove(order_id)?;
        let level = self.levels.get_mut(&price)?;
        let order = level.remove(order_id);
        // Remove empty price levels to keep book clean
        if level.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// Get the best ask (lowest price) with the quantity resting there
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Get the best ask price
    pub fn best_ask_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Order with the highest priority
    pub fn front(&self) -> Option<&Order> {
        self.levels.values().next().and_then(PriceLevel::front)
    }

    /// Execute `quantity` against the highest-priority order
    pub(crate) fn fill_best(&mut self, quantity: Quantity) -> Option<Order> {
        let (price, level) = self.levels.iter_mut().next()?;
        let price = *price;
        let order = level.fill_front(quantity)?;
        if order.is_filled() {
            self.index.remove(&order.id);
        }
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(order)
    }

    /// Resting orders in priority order
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.levels.values().flat_map(PriceLevel::iter)
    }

    /// Get depth snapshot (top N price levels)
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.index.clear();
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the total number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }
}
