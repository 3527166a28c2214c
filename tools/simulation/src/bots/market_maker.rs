//! Market maker bot
//!
//! Wraps the passive arbitrage trader. If nobody has posted an order for a
//! quiet period, prints a one-share trade with itself one tick inside the
//! spread to pull the market toward fair value.

use std::time::Duration;

use matching_engine::Fill;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;
use types::numeric::Price;
use types::order::Order;

use super::passive_arbitrage::PassiveArbitrageTrader;
use crate::shadow_book::ShadowBook;
use crate::state::TraderState;
use crate::traits::Trader;

/// Configuration for the market maker bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMakerConfig {
    /// Inactivity before making the market
    pub quiet_period_ms: u64,
}

impl MarketMakerConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 3000,
        }
    }
}

pub struct MarketMakerTrader {
    inner: PassiveArbitrageTrader,
    quiet_period: Duration,
    /// Disarmed after shutdown
    deadline: Option<Instant>,
}

impl MarketMakerTrader {
    pub fn new(inner: PassiveArbitrageTrader, config: MarketMakerConfig) -> Self {
        let quiet_period = config.quiet_period();
        Self {
            inner,
            quiet_period,
            deadline: Some(Instant::now() + quiet_period),
        }
    }

    /// Price for a self-trade, if the book warrants one
    fn quote(&self, book: &ShadowBook) -> Option<Price> {
        let fair = self.inner.state().fair_value;
        let tick = Price::tick();

        match (book.best_bid(), book.best_ask()) {
            (None, None) => None,
            (None, Some(ask)) if ask > fair + tick => Some(ask - tick),
            (Some(bid), Some(ask)) if bid + tick < ask => Some(bid + tick),
            (Some(bid), None) if bid < fair - tick => Some(bid + tick),
            _ => None,
        }
    }
}

impl Trader for MarketMakerTrader {
    fn name(&self) -> &'static str {
        "market-maker"
    }

    fn on_new_order(&mut self, order: &Order, book: &ShadowBook) -> Vec<Order> {
        if self.deadline.is_some() {
            self.deadline = Some(Instant::now() + self.quiet_period);
        }
        self.inner.on_new_order(order, book)
    }

    fn on_filled_order(&mut self, fill: &Fill, book: &ShadowBook) -> Vec<Order> {
        let orders = self.inner.on_filled_order(fill, book);
        let state = self.inner.state_mut();
        state.forget_exhausted(&fill.sell_order);
        state.forget_exhausted(&fill.buy_order);
        orders
    }

    fn on_timer(&mut self, now: Instant, book: &ShadowBook) -> Vec<Order> {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Vec::new(),
        }
        self.deadline = Some(now + self.quiet_period);

        let Some(price) = self.quote(book) else {
            return Vec::new();
        };
        info!(price = %price, "Making the market");

        let sell = Order::sell(price, 1);
        let buy = Order::buy(price, 1);
        let own = &mut self.inner.state_mut().own_orders;
        own.insert(sell.id);
        own.insert(buy.id);
        vec![sell, buy]
    }

    fn next_timer(&self) -> Option<Instant> {
        self.deadline
    }

    fn on_shutdown(&mut self) {
        self.deadline = None;
        self.inner.on_shutdown();
    }

    fn state(&self) -> &TraderState {
        self.inner.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn market_maker() -> MarketMakerTrader {
        let inner = PassiveArbitrageTrader::with_state(TraderState::new(
            Price::from_u64(100),
            Decimal::from(1000),
            10,
        ));
        MarketMakerTrader::new(inner, MarketMakerConfig::default())
    }

    fn book_with(bid: Option<u64>, ask: Option<u64>) -> ShadowBook {
        let mut book = ShadowBook::new();
        if let Some(bid) = bid {
            book.new_order(&Order::buy(Price::from_u64(bid), 1));
        }
        if let Some(ask) = ask {
            book.new_order(&Order::sell(Price::from_u64(ask), 1));
        }
        book
    }

    fn fire(trader: &mut MarketMakerTrader, book: &ShadowBook) -> Vec<Order> {
        let now = trader.next_timer().unwrap();
        trader.on_timer(now, book)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_book_does_nothing() {
        let mut trader = market_maker();
        assert!(fire(&mut trader, &ShadowBook::new()).is_empty());
        // Re-armed even when nothing was quoted
        assert!(trader.next_timer().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_asks_far_above_fair() {
        let mut trader = market_maker();
        let out = fire(&mut trader, &book_with(None, Some(120)));

        assert_eq!(out.len(), 2);
        assert!(out[0].is_sell() && out[1].is_buy());
        assert!(out.iter().all(|o| o.price == Price::from_u64(119) && o.quantity == 1));
        assert!(out.iter().all(|o| trader.state().own_orders.contains(&o.id)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_asks_near_fair() {
        let mut trader = market_maker();
        assert!(fire(&mut trader, &book_with(None, Some(101))).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wide_spread_quotes_above_bid() {
        let mut trader = market_maker();
        let out = fire(&mut trader, &book_with(Some(95), Some(105)));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].price, Price::from_u64(96));
    }

    #[tokio::test(start_paused = true)]
    async fn test_narrow_spread_does_nothing() {
        let mut trader = market_maker();
        assert!(fire(&mut trader, &book_with(Some(99), Some(100))).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_bids_below_fair() {
        let mut trader = market_maker();
        let out = fire(&mut trader, &book_with(Some(80), None));
        assert_eq!(out[0].price, Price::from_u64(81));

        let mut trader = market_maker();
        assert!(fire(&mut trader, &book_with(Some(99), None)).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_pushes_deadline() {
        let mut trader = market_maker();
        let first = trader.next_timer().unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        trader.on_new_order(&Order::buy(Price::from_u64(99), 1), &ShadowBook::new());

        let second = trader.next_timer().unwrap();
        assert!(second > first);
        // Firing at the stale deadline is a no-op
        assert!(trader.on_timer(first, &book_with(None, Some(120))).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_own_quotes_do_not_trigger_arbitrage() {
        let mut trader = market_maker();
        let out = fire(&mut trader, &book_with(None, Some(120)));
        for order in &out {
            assert!(trader.on_new_order(order, &ShadowBook::new()).is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_trade_releases_quote_ids() {
        let mut trader = market_maker();
        let out = fire(&mut trader, &book_with(None, Some(120)));
        let (mut sell, mut buy) = (out[0].clone(), out[1].clone());
        sell.quantity = 0;
        buy.quantity = 0;

        let fill = Fill {
            sell_order: sell,
            buy_order: buy,
            quantity: 1,
            price: Price::from_u64(119),
        };
        assert!(trader.on_filled_order(&fill, &ShadowBook::new()).is_empty());
        assert!(trader.state().own_orders.is_empty());
        assert_eq!(trader.state().inventory, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_disarms_timer() {
        let mut trader = market_maker();
        trader.on_shutdown();
        assert!(trader.next_timer().is_none());
        assert!(trader.on_timer(Instant::now(), &book_with(None, Some(120))).is_empty());
    }
}
