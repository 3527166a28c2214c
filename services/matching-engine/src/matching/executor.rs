//! Trade execution logic
//!
//! Drains crosses from the top of the book, producing one fill per match
//! iteration.

use tracing::debug;

use crate::book::OrderBook;
use crate::events::Fill;

use super::crossing;

/// Match executor for crossing the top of the book
#[derive(Debug, Default)]
pub struct MatchExecutor {
    fills_executed: u64,
}

impl MatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the matching loop until no cross remains or a side empties
    ///
    /// Each iteration executes min(front bid qty, front ask qty) at the
    /// midpoint strike. Orders that reach zero leave the book in the same
    /// step, so equal quantities remove both.
    pub fn run(&mut self, book: &mut OrderBook) -> Vec<Fill> {
        let mut fills = Vec::new();

        loop {
            let (bid, ask) = match (book.bids.front(), book.asks.front()) {
                (Some(bid), Some(ask)) => (bid, ask),
                _ => break,
            };
            if !crossing::can_match(bid.price, ask.price) {
                break;
            }

            let price = crossing::strike_price(bid.price, ask.price);
            let quantity = bid.quantity.min(ask.quantity);

            let (Some(buy_order), Some(sell_order)) =
                (book.bids.fill_best(quantity), book.asks.fill_best(quantity))
            else {
                break;
            };

            debug!(
                sell_order = %sell_order.id,
                buy_order = %buy_order.id,
                quantity,
                price = %price,
                "Orders matched"
            );

            self.fills_executed += 1;
            fills.push(Fill {
                sell_order,
                buy_order,
                quantity,
                price,
            });
        }

        fills
    }

    /// Fills produced since creation or the last `reset`
    pub fn fills_executed(&self) -> u64 {
        self.fills_executed
    }

    pub fn reset(&mut self) {
        self.fills_executed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::Price;
    use types::order::Order;

    #[test]
    fn test_no_cross_no_fill() {
        let mut book = OrderBook::new();
        book.insert(Order::sell(Price::from_u64(101), 1));
        book.insert(Order::buy(Price::from_u64(100), 1));

        let mut executor = MatchExecutor::new();
        assert!(executor.run(&mut book).is_empty());
        assert_eq!(book.order_count(), 2);
    }

    #[test]
    fn test_equal_quantities_remove_both() {
        let mut book = OrderBook::new();
        book.insert(Order::sell(Price::from_u64(101), 10));
        book.insert(Order::buy(Price::from_u64(101), 10));

        let mut executor = MatchExecutor::new();
        let fills = executor.run(&mut book);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].quantity, 10);
        assert_eq!(fills[0].price, Price::from_u64(101));
        assert!(fills[0].sell_order.is_filled());
        assert!(fills[0].buy_order.is_filled());
        assert!(book.is_empty());
    }

    #[test]
    fn test_partial_fill_leaves_remainder() {
        let mut book = OrderBook::new();
        book.insert(Order::sell(Price::from_u64(100), 5));
        let buy = Order::buy(Price::from_u64(102), 8);
        let buy_id = buy.id;
        book.insert(buy);

        let mut executor = MatchExecutor::new();
        let fills = executor.run(&mut book);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].quantity, 5);
        assert_eq!(fills[0].price, Price::from_u64(101));
        assert_eq!(fills[0].buy_order.quantity, 3);
        assert!(book.asks().is_empty());
        assert_eq!(book.bids().front().unwrap().id, buy_id);
        assert_eq!(book.bids().front().unwrap().quantity, 3);
    }

    #[test]
    fn test_sweeps_multiple_levels() {
        let mut book = OrderBook::new();
        book.insert(Order::sell(Price::from_u64(100), 2));
        book.insert(Order::sell(Price::from_u64(101), 2));
        book.insert(Order::sell(Price::from_u64(105), 2));
        book.insert(Order::buy(Price::from_u64(102), 5));

        let mut executor = MatchExecutor::new();
        let fills = executor.run(&mut book);

        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].price, Price::from_u64(101));
        assert_eq!(fills[1].price, Price::from_cents(10150));
        assert_eq!(executor.fills_executed(), 2);
        assert_eq!(book.best_bid(), Some(Price::from_u64(102)));
        assert_eq!(book.best_ask(), Some(Price::from_u64(105)));
    }
}
