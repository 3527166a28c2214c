//! Trader capability
//!
//! A strategy reacts to market events and returns the orders it wants
//! submitted. It never talks to the engine itself; the owning agent does
//! that asynchronously, after the strategy's simulated latency.

use std::time::Duration;

use matching_engine::Fill;
use tokio::time::Instant;
use types::order::Order;

use crate::shadow_book::ShadowBook;
use crate::state::TraderState;

pub trait Trader: Send + 'static {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// An order was accepted by the engine
    fn on_new_order(&mut self, order: &Order, book: &ShadowBook) -> Vec<Order>;

    /// One match iteration executed. `book` already reflects the fill.
    fn on_filled_order(&mut self, fill: &Fill, book: &ShadowBook) -> Vec<Order>;

    /// The deadline from `next_timer` has passed
    fn on_timer(&mut self, _now: Instant, _book: &ShadowBook) -> Vec<Order> {
        Vec::new()
    }

    /// Next time the strategy wants `on_timer`, if any
    fn next_timer(&self) -> Option<Instant> {
        None
    }

    /// Delay between deciding on an order and the engine seeing it
    fn submit_latency(&self) -> Duration {
        Duration::ZERO
    }

    /// Delay before a fill is recognized by the strategy
    fn fill_latency(&self) -> Duration {
        Duration::ZERO
    }

    /// Stop timers. No further orders are expected afterwards.
    fn on_shutdown(&mut self) {}

    fn state(&self) -> &TraderState;
}
