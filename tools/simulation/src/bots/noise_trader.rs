//! Noise trader bot
//!
//! No informational edge. At random intervals picks a random side, size and
//! price, checks it can afford the trade, and sends it after a simulated
//! network delay. Provides background liquidity.

use std::collections::HashSet;
use std::time::Duration;

use matching_engine::Fill;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use crate::shadow_book::ShadowBook;
use crate::state::TraderState;
use crate::traits::Trader;

/// Size cap used when the trader holds at most one share
const FLAT_QUANTITY_CAP: Quantity = 10;

/// Configuration for noise traders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTraderConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Inter-arrival bounds, whole seconds, inclusive
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    /// Valuation band, lower bound inclusive
    pub price_floor: Price,
    /// Valuation band, upper bound exclusive
    pub price_ceiling: Price,
}

impl Default for NoiseTraderConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 6,
            max_latency_ms: 30,
            min_interval_secs: 2,
            max_interval_secs: 6,
            price_floor: Price::from_u64(60),
            price_ceiling: Price::from_u64(140),
        }
    }
}

pub struct NoiseTrader {
    id: usize,
    state: TraderState,
    config: NoiseTraderConfig,
    latency: Duration,
    next_fire: Option<Instant>,
    last_price: Option<Price>,
    my_trades: HashSet<OrderId>,
    rng: ChaCha8Rng,
}

impl NoiseTrader {
    /// Create a noise trader with a deterministic seed.
    pub fn new(id: usize, fair_value: Price, config: NoiseTraderConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = TraderState::endowed(fair_value, &mut rng);
        Self::with_state(id, state, config, rng)
    }

    pub fn with_state(id: usize, state: TraderState, config: NoiseTraderConfig, mut rng: ChaCha8Rng) -> Self {
        let latency_ms = if config.max_latency_ms > config.min_latency_ms {
            rng.gen_range(config.min_latency_ms..config.max_latency_ms)
        } else {
            config.min_latency_ms
        };

        let mut trader = Self {
            id,
            state,
            config,
            latency: Duration::from_millis(latency_ms),
            next_fire: None,
            last_price: None,
            my_trades: HashSet::new(),
            rng,
        };
        trader.next_fire = Some(Instant::now() + trader.new_interval());
        trader
    }

    pub fn last_price(&self) -> Option<Price> {
        self.last_price
    }

    pub fn is_mine(&self, id: &OrderId) -> bool {
        self.my_trades.contains(id)
    }

    fn new_interval(&mut self) -> Duration {
        let secs = self
            .rng
            .gen_range(self.config.min_interval_secs..=self.config.max_interval_secs.max(self.config.min_interval_secs));
        Duration::from_secs(secs)
    }

    fn random_order(&mut self) -> Order {
        let cap = if self.state.inventory > 1 {
            self.state.inventory
        } else {
            FLAT_QUANTITY_CAP
        };
        let quantity = self.rng.gen_range(1..=cap);

        let floor = self.config.price_floor.as_cents();
        let ceiling = self.config.price_ceiling.as_cents().max(floor + 1);
        let price = Price::from_cents(self.rng.gen_range(floor..ceiling));

        let side = if self.rng.gen_bool(0.5) { Side::Sell } else { Side::Buy };
        Order::new(side, price, quantity)
    }

    /// Local, non-authoritative affordability check. Commits on success.
    fn try_commit(&mut self, order: &Order) -> bool {
        match order.side {
            Side::Buy => {
                let cost = order.notional();
                if self.state.cash < cost {
                    return false;
                }
                self.state.cash -= cost;
            }
            Side::Sell => {
                if self.state.inventory < order.quantity {
                    return false;
                }
                self.state.inventory -= order.quantity;
            }
        }
        true
    }
}

impl Trader for NoiseTrader {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn on_new_order(&mut self, _order: &Order, _book: &ShadowBook) -> Vec<Order> {
        Vec::new()
    }

    fn on_filled_order(&mut self, fill: &Fill, _book: &ShadowBook) -> Vec<Order> {
        if self.my_trades.contains(&fill.sell_order.id) {
            self.state.cash += fill.price.notional(fill.quantity);
        } else if self.my_trades.contains(&fill.buy_order.id) {
            self.state.inventory += fill.quantity;
        }
        for leg in [&fill.sell_order, &fill.buy_order] {
            if leg.is_filled() {
                self.my_trades.remove(&leg.id);
            }
        }
        self.last_price = Some(fill.price);
        Vec::new()
    }

    fn on_timer(&mut self, now: Instant, _book: &ShadowBook) -> Vec<Order> {
        match self.next_fire {
            Some(at) if now >= at => {}
            _ => return Vec::new(),
        }
        let interval = self.new_interval();
        self.next_fire = Some(now + interval);

        let order = self.random_order();
        if !self.try_commit(&order) {
            // Can't trade right now
            return Vec::new();
        }

        debug!(
            trader = self.id,
            side = ?order.side,
            price = %order.price,
            quantity = order.quantity,
            "Noise trader placing order"
        );
        self.my_trades.insert(order.id);
        vec![order]
    }

    fn next_timer(&self) -> Option<Instant> {
        self.next_fire
    }

    fn submit_latency(&self) -> Duration {
        self.latency
    }

    fn fill_latency(&self) -> Duration {
        self.latency
    }

    fn on_shutdown(&mut self) {
        self.next_fire = None;
    }

    fn state(&self) -> &TraderState {
        &self.state
    }
}
