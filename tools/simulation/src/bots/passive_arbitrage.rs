//! Passive arbitrage trader
//!
//! Knows the fair value of the stock. Whenever someone offers to sell below
//! it, or bid above it, takes the other side at the same price and size.
//! After each fill tries to get back in one tick toward fair value while
//! the trade is still profitable.

use matching_engine::Fill;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use types::numeric::Price;
use types::order::Order;

use crate::shadow_book::ShadowBook;
use crate::state::TraderState;
use crate::traits::Trader;

pub struct PassiveArbitrageTrader {
    state: TraderState,
}

impl PassiveArbitrageTrader {
    /// Create a trader with a seeded random endowment
    pub fn new(fair_value: Price, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::with_state(TraderState::endowed(fair_value, &mut rng))
    }

    pub fn with_state(state: TraderState) -> Self {
        Self { state }
    }

    pub fn state_mut(&mut self) -> &mut TraderState {
        &mut self.state
    }

    fn is_favorable(&self, order: &Order) -> bool {
        let fair = self.state.fair_value;
        (order.is_sell() && order.price < fair) || (order.is_buy() && order.price > fair)
    }

    /// Buy back after selling, one tick above the best bid
    fn rebuy(&mut self, fill: &Fill, book: &ShadowBook) -> Option<Order> {
        let fair = self.state.fair_value;
        let bid = book
            .best_bid()
            .map(|bid| bid + Price::tick())
            .unwrap_or(fair - Price::cent());

        if bid >= fair {
            debug!(price = %bid, "Won't rebuy stock");
            return None;
        }
        info!(price = %bid, quantity = fill.quantity, "Rebuying stock");
        Some(Order::buy(bid, fill.quantity))
    }

    /// Sell again after buying, one tick below the best ask
    fn resell(&mut self, fill: &Fill, book: &ShadowBook) -> Option<Order> {
        let fair = self.state.fair_value;
        let ask = book
            .best_ask()
            .map(|ask| ask - Price::tick())
            .unwrap_or(fair + Price::cent());

        if ask <= fair {
            debug!(price = %ask, "Won't resell stock");
            return None;
        }
        info!(price = %ask, quantity = fill.quantity, "Reselling stock");
        Some(Order::sell(ask, fill.quantity))
    }
}

impl Trader for PassiveArbitrageTrader {
    fn name(&self) -> &'static str {
        "arbitrage"
    }

    fn on_new_order(&mut self, order: &Order, _book: &ShadowBook) -> Vec<Order> {
        // Don't trade on our own orders
        if self.state.is_own(&order.id) || !self.is_favorable(order) {
            return Vec::new();
        }

        let counter = Order::new(order.side.opposite(), order.price, order.quantity);
        info!(
            side = ?counter.side,
            price = %counter.price,
            quantity = counter.quantity,
            "Taking arbitrage"
        );
        self.state.reserve(counter.clone());
        vec![counter]
    }

    fn on_filled_order(&mut self, fill: &Fill, book: &ShadowBook) -> Vec<Order> {
        let reentry = if self.state.settle(&fill.sell_order.id, fill.quantity) {
            self.state.cash += fill.price.notional(fill.quantity);
            self.rebuy(fill, book)
        } else if self.state.settle(&fill.buy_order.id, fill.quantity) {
            self.state.inventory += fill.quantity;
            self.resell(fill, book)
        } else {
            return Vec::new();
        };

        debug!(cash = %self.state.cash, inventory = self.state.inventory, "Arbitrage position");
        match reentry {
            Some(order) => {
                self.state.reserve(order.clone());
                vec![order]
            }
            None => Vec::new(),
        }
    }

    fn state(&self) -> &TraderState {
        &self.state
    }
}
