//! HFT front end
//!
//! `HftTrader` decorates any strategy with a shadow book and runs it as an
//! independent agent. The agent task is the single writer of the strategy's
//! state: broadcasts, strategy timers and latency-delayed fills all pass
//! through one `select!` loop. Orders leave through spawned tasks so a slow
//! engine never stalls a decision.

use std::future;
use std::time::Duration;

use matching_engine::{EngineError, EngineHandle, Fill, MarketEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};
use types::ids::ParticipantId;
use types::order::Order;

use crate::shadow_book::ShadowBook;
use crate::traits::Trader;

/// What the agent loop should do after an event
#[derive(Debug)]
pub enum Reaction {
    Submit(Vec<Order>),
    /// Hand the fill to the strategy once `delay` has elapsed
    Defer { fill: Fill, delay: Duration },
    Shutdown,
}

pub struct HftTrader<T> {
    inner: T,
    book: ShadowBook,
}

impl<T: Trader> HftTrader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            book: ShadowBook::new(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn book(&self) -> &ShadowBook {
        &self.book
    }

    /// Update the shadow book and let the strategy react
    pub fn on_event(&mut self, event: MarketEvent) -> Reaction {
        match event {
            MarketEvent::NewOrder(order) => {
                self.book.new_order(&order);
                Reaction::Submit(self.inner.on_new_order(&order, &self.book))
            }
            MarketEvent::FilledOrder(fill) => {
                self.book.filled(&fill);
                let delay = self.inner.fill_latency();
                if delay.is_zero() {
                    Reaction::Submit(self.inner.on_filled_order(&fill, &self.book))
                } else {
                    Reaction::Defer { fill, delay }
                }
            }
            MarketEvent::CancelledOrder(cancellation) => {
                // Acks carry `cancel`; only the public notice changes the book
                if cancellation.cancel.is_none() {
                    self.book.cancelled(&cancellation.id);
                }
                Reaction::Submit(Vec::new())
            }
            MarketEvent::Books(snapshot) => {
                self.book.load(&snapshot);
                Reaction::Submit(Vec::new())
            }
            MarketEvent::RoundStarted => {
                self.book.clear();
                Reaction::Submit(Vec::new())
            }
            MarketEvent::RoundStopped => {
                self.inner.on_shutdown();
                Reaction::Shutdown
            }
        }
    }

    /// Deliver a fill whose recognition was delayed
    pub fn deliver_fill(&mut self, fill: &Fill) -> Vec<Order> {
        self.inner.on_filled_order(fill, &self.book)
    }

    pub fn on_timer(&mut self, now: Instant) -> Vec<Order> {
        self.inner.on_timer(now, &self.book)
    }

    /// Register with the engine and start the agent task
    pub fn spawn(self, engine: EngineHandle) -> Result<(ParticipantId, JoinHandle<T>), EngineError> {
        let (participant, events) = engine.connect()?;
        info!(participant = %participant, strategy = self.inner.name(), "Trader connected");
        let task = tokio::spawn(self.run(engine, participant, events));
        Ok((participant, task))
    }

    async fn run(
        mut self,
        engine: EngineHandle,
        participant: ParticipantId,
        mut events: mpsc::Receiver<MarketEvent>,
    ) -> T {
        let (fills_tx, mut fills_rx) = mpsc::unbounded_channel::<Fill>();

        loop {
            let deadline = self.inner.next_timer();
            let orders = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => match self.on_event(event) {
                        Reaction::Submit(orders) => orders,
                        Reaction::Defer { fill, delay } => {
                            let fills_tx = fills_tx.clone();
                            tokio::spawn(async move {
                                time::sleep(delay).await;
                                let _ = fills_tx.send(fill);
                            });
                            Vec::new()
                        }
                        Reaction::Shutdown => break,
                    },
                    // Dropped by the engine
                    None => break,
                },
                Some(fill) = fills_rx.recv() => self.deliver_fill(&fill),
                _ = wait_until(deadline) => self.on_timer(Instant::now()),
            };

            self.submit(orders, participant, &engine);
        }

        self.inner.on_shutdown();
        let _ = engine.disconnect(participant);
        info!(participant = %participant, strategy = self.inner.name(), "Trader stopped");
        self.inner
    }

    /// Non-blocking submission, delayed by the strategy's latency
    fn submit(&self, orders: Vec<Order>, participant: ParticipantId, engine: &EngineHandle) {
        if orders.is_empty() {
            return;
        }
        let latency = self.inner.submit_latency();
        let engine = engine.clone();

        tokio::spawn(async move {
            if !latency.is_zero() {
                time::sleep(latency).await;
            }
            for order in orders {
                if let Err(err) = engine.submit(order.with_owner(participant)) {
                    debug!(participant = %participant, error = %err, "Order not delivered");
                    return;
                }
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::PassiveArbitrageTrader;
    use crate::state::TraderState;
    use matching_engine::Cancellation;
    use rust_decimal::Decimal;
    use types::numeric::Price;
    use types::order::Side;

    fn arbitrage() -> HftTrader<PassiveArbitrageTrader> {
        HftTrader::new(PassiveArbitrageTrader::with_state(TraderState::new(
            Price::from_u64(100),
            Decimal::from(1000),
            10,
        )))
    }

    #[test]
    fn test_new_order_updates_book_before_strategy() {
        let mut trader = arbitrage();
        let cheap = Order::sell(Price::from_u64(90), 5);

        let Reaction::Submit(orders) = trader.on_event(MarketEvent::NewOrder(cheap)) else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        assert_eq!(trader.book().best_ask(), Some(Price::from_u64(90)));
    }

    #[test]
    fn test_arbitrage_sequence() {
        let mut trader = arbitrage();
        let mut react = |order: Order| match trader.on_event(MarketEvent::NewOrder(order)) {
            Reaction::Submit(orders) => orders,
            other => panic!("unexpected {other:?}"),
        };

        let taken = react(Order::sell(Price::from_u64(90), 5));
        assert_eq!(taken.len(), 1);
        assert_eq!((taken[0].side, taken[0].price, taken[0].quantity), (Side::Buy, Price::from_u64(90), 5));

        let hit = react(Order::buy(Price::from_u64(110), 5));
        assert_eq!(hit.len(), 1);
        assert_eq!((hit[0].side, hit[0].price, hit[0].quantity), (Side::Sell, Price::from_u64(110), 5));

        assert!(react(Order::sell(Price::from_u64(105), 5)).is_empty());

        let state = trader.inner().state();
        assert_eq!(state.cash, Decimal::from(550));
        assert_eq!(state.inventory, 5);
        assert_eq!(state.outstanding.len(), 2);
    }

    #[test]
    fn test_public_cancel_updates_book_ack_does_not() {
        let mut trader = arbitrage();
        let order = Order::buy(Price::from_u64(95), 1);
        trader.on_event(MarketEvent::NewOrder(order.clone()));

        trader.on_event(MarketEvent::CancelledOrder(Cancellation::ack(order.id, true)));
        assert_eq!(trader.book().best_bid(), Some(Price::from_u64(95)));

        trader.on_event(MarketEvent::CancelledOrder(Cancellation::public(order.id)));
        assert_eq!(trader.book().best_bid(), None);
    }

    #[test]
    fn test_round_events() {
        let mut trader = arbitrage();
        trader.on_event(MarketEvent::NewOrder(Order::buy(Price::from_u64(95), 1)));

        assert!(matches!(trader.on_event(MarketEvent::RoundStarted), Reaction::Submit(o) if o.is_empty()));
        assert!(trader.book().is_empty());
        assert!(matches!(trader.on_event(MarketEvent::RoundStopped), Reaction::Shutdown));
    }
}
