//! Private trader state
//!
//! Owned by exactly one agent and mutated only from its own handlers.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rust_decimal::Decimal;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Shares every trader starts with
pub const STARTING_INVENTORY: Quantity = 10;

/// Cash a trader would hold with no shares
pub const STARTING_WEALTH: i64 = 2000;

/// Per-agent balances and order bookkeeping
#[derive(Debug, Clone)]
pub struct TraderState {
    pub cash: Decimal,
    pub inventory: Quantity,
    pub fair_value: Price,
    /// Orders awaiting a fill, by id
    pub outstanding: HashMap<OrderId, Order>,
    /// Orders placed for their own sake that the strategy must never react to
    pub own_orders: HashSet<OrderId>,
}

impl TraderState {
    pub fn new(fair_value: Price, cash: Decimal, inventory: Quantity) -> Self {
        Self {
            cash,
            inventory,
            fair_value,
            outstanding: HashMap::new(),
            own_orders: HashSet::new(),
        }
    }

    /// Starting endowment: ten shares, and cash of 2000 less the cost of
    /// those shares at a random valuation in [60, 140)
    pub fn endowed<R: Rng>(fair_value: Price, rng: &mut R) -> Self {
        let valuation = Price::from_cents(rng.gen_range(6_000..14_000));
        let cash = Decimal::from(STARTING_WEALTH) - valuation.notional(STARTING_INVENTORY);
        Self::new(fair_value, cash, STARTING_INVENTORY)
    }

    /// Whether this trader produced the order
    pub fn is_own(&self, id: &OrderId) -> bool {
        self.outstanding.contains_key(id) || self.own_orders.contains(id)
    }

    /// Track an order until it fills, reserving what it commits
    pub fn reserve(&mut self, order: Order) {
        if order.is_sell() {
            self.inventory -= order.quantity;
        } else {
            self.cash -= order.notional();
        }
        self.outstanding.insert(order.id, order);
    }

    /// Reduce an outstanding order by an executed amount
    ///
    /// Returns false if the order is not ours.
    pub fn settle(&mut self, id: &OrderId, quantity: Quantity) -> bool {
        let Some(order) = self.outstanding.get_mut(id) else {
            return false;
        };
        order.quantity -= quantity;
        if order.quantity <= 0 {
            self.outstanding.remove(id);
        }
        true
    }

    /// Stop tracking a self-trade leg once a fill snapshot shows it exhausted
    pub fn forget_exhausted(&mut self, order: &Order) {
        if order.quantity <= 0 {
            self.own_orders.remove(&order.id);
        }
    }

    /// Cash plus inventory marked at `price`
    pub fn wealth_at(&self, price: Price) -> Decimal {
        self.cash + price.notional(self.inventory)
    }
}
