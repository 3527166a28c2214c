//! Matching engine scenarios and book invariants
//!
//! - Fixed trading scenarios (full cross, partial cross, stopped round)
//! - Cancellation protocol (found / not found)
//! - Property tests over random order flow (proptest)

use matching_engine::{
    Cancellation, EngineConfig, EngineMessage, MarketEvent, MatchingEngine, Rejection,
};
use tokio::sync::mpsc;
use types::ids::{OrderId, ParticipantId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

fn running_engine() -> MatchingEngine {
    MatchingEngine::new(EngineConfig {
        start_running: true,
        ..EngineConfig::default()
    })
}

fn connect(engine: &mut MatchingEngine) -> (ParticipantId, mpsc::Receiver<MarketEvent>) {
    let participant = ParticipantId::next();
    let (mailbox, events) = mpsc::channel(4096);
    engine.handle(EngineMessage::Connect {
        participant,
        mailbox,
    });
    (participant, events)
}

fn drain(events: &mut mpsc::Receiver<MarketEvent>) -> Vec<MarketEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn fills(events: &[MarketEvent]) -> Vec<(Quantity, Price)> {
    events
        .iter()
        .filter_map(|event| match event {
            MarketEvent::FilledOrder(fill) => Some((fill.quantity, fill.price)),
            _ => None,
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════
// Trading scenarios
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_equal_cross_empties_both_sides() {
    let mut engine = running_engine();
    let (_, mut events) = connect(&mut engine);

    engine.handle(EngineMessage::SubmitOrder {
        order: Order::sell(Price::from_u64(101), 10),
    });
    engine.handle(EngineMessage::SubmitOrder {
        order: Order::buy(Price::from_u64(101), 10),
    });

    assert_eq!(fills(&drain(&mut events)), vec![(10, Price::from_u64(101))]);
    assert!(engine.book().asks().is_empty());
    assert!(engine.book().bids().is_empty());
}

#[test]
fn test_partial_cross_strikes_at_midpoint() {
    let mut engine = running_engine();
    let (_, mut events) = connect(&mut engine);

    engine.handle(EngineMessage::SubmitOrder {
        order: Order::sell(Price::from_u64(100), 5),
    });
    engine.handle(EngineMessage::SubmitOrder {
        order: Order::buy(Price::from_u64(102), 8),
    });

    assert_eq!(fills(&drain(&mut events)), vec![(5, Price::from_u64(101))]);
    assert!(engine.book().asks().is_empty());

    let resting: Vec<_> = engine.book().bids().orders().collect();
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].quantity, 3);
    assert_eq!(resting[0].price, Price::from_u64(102));
}

#[test]
fn test_stopped_round_ignores_orders() {
    let mut engine = MatchingEngine::new(EngineConfig::default());
    let (_, mut events) = connect(&mut engine);

    assert_eq!(
        engine.submit_order(Order::sell(Price::from_u64(100), 10)),
        Err(Rejection::NotRunning)
    );
    assert!(engine.book().is_empty());
    assert!(drain(&mut events).is_empty());
}

#[test]
fn test_fill_carries_remaining_quantities() {
    let mut engine = running_engine();
    let sell = Order::sell(Price::from_u64(100), 5);
    let sell_id = sell.id;
    engine.submit_order(sell).unwrap();

    let fills = engine.submit_order(Order::buy(Price::from_u64(100), 2)).unwrap();

    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].sell_order.id, sell_id);
    assert_eq!(fills[0].sell_order.quantity, 3);
    assert_eq!(fills[0].buy_order.quantity, 0);
}

#[test]
fn test_fifo_within_price_level() {
    let mut engine = running_engine();
    let first = Order::sell(Price::from_u64(100), 1);
    let second = Order::sell(Price::from_u64(100), 1);
    let first_id = first.id;
    let second_id = second.id;
    engine.submit_order(first).unwrap();
    engine.submit_order(second).unwrap();

    let fills = engine.submit_order(Order::buy(Price::from_u64(100), 1)).unwrap();

    assert_eq!(fills[0].sell_order.id, first_id);
    assert_eq!(engine.book().asks().front().unwrap().id, second_id);
}

// ═══════════════════════════════════════════════════════════════════
// Cancellation protocol
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_cancel_after_fill_reports_not_found() {
    let mut engine = running_engine();
    let (trader, mut events) = connect(&mut engine);

    let sell = Order::sell(Price::from_u64(100), 1).with_owner(trader);
    let sell_id = sell.id;
    engine.submit_order(sell).unwrap();
    engine.submit_order(Order::buy(Price::from_u64(100), 1)).unwrap();
    drain(&mut events);

    engine.handle(EngineMessage::CancelOrder {
        id: sell_id,
        requester: trader,
    });

    assert_eq!(
        drain(&mut events),
        vec![MarketEvent::CancelledOrder(Cancellation::ack(sell_id, false))]
    );
}

#[test]
fn test_cancel_removes_exactly_one_order() {
    let mut engine = running_engine();
    let (trader, _events) = connect(&mut engine);
    let keep = Order::buy(Price::from_u64(99), 1);
    let target = Order::buy(Price::from_u64(99), 2).with_owner(trader);
    let target_id = target.id;
    let keep_id = keep.id;
    engine.submit_order(keep).unwrap();
    engine.submit_order(target).unwrap();

    assert_eq!(engine.cancel_order(target_id, trader), Some(true));

    let ids: Vec<OrderId> = engine.book().bids().orders().map(|o| o.id).collect();
    assert_eq!(ids, vec![keep_id]);
}

// ═══════════════════════════════════════════════════════════════════
// Property tests
// ═══════════════════════════════════════════════════════════════════

mod fuzz {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Prices in a narrow band so crosses are frequent
    fn order_strategy() -> impl Strategy<Value = Order> {
        (any::<bool>(), 9_000i64..=11_000, 1i64..=20).prop_map(|(buy, cents, qty)| {
            let side = if buy { Side::Buy } else { Side::Sell };
            Order::new(side, Price::from_cents(cents), qty)
        })
    }

    fn assert_book_invariants(
        engine: &MatchingEngine,
        arrival: &HashMap<OrderId, usize>,
    ) -> Result<(), TestCaseError> {
        let asks: Vec<_> = engine.book().asks().orders().collect();
        let bids: Vec<_> = engine.book().bids().orders().collect();

        for pair in asks.windows(2) {
            prop_assert!(pair[0].price <= pair[1].price);
            if pair[0].price == pair[1].price {
                prop_assert!(arrival[&pair[0].id] < arrival[&pair[1].id]);
            }
        }
        for pair in bids.windows(2) {
            prop_assert!(pair[0].price >= pair[1].price);
            if pair[0].price == pair[1].price {
                prop_assert!(arrival[&pair[0].id] < arrival[&pair[1].id]);
            }
        }
        for order in asks.iter().chain(bids.iter()) {
            prop_assert!(order.quantity > 0);
        }
        if let (Some(bid), Some(ask)) = (engine.book().best_bid(), engine.book().best_ask()) {
            prop_assert!(bid < ask, "crossed book: bid {} ask {}", bid, ask);
        }
        Ok(())
    }

    proptest! {
        /// Invariant: sides stay sorted, quantities positive, never crossed.
        #[test]
        fn fuzz_book_invariants(orders in prop::collection::vec(order_strategy(), 1..60)) {
            let mut engine = running_engine();
            let mut arrival = HashMap::new();
            for (seq, order) in orders.into_iter().enumerate() {
                arrival.insert(order.id, seq);
                engine.submit_order(order).unwrap();
                assert_book_invariants(&engine, &arrival)?;
            }
        }

        /// Invariant: every strike is the rounded midpoint and lies inside
        /// the crossing pair's limit prices.
        #[test]
        fn fuzz_strike_within_limits(orders in prop::collection::vec(order_strategy(), 1..60)) {
            let mut engine = running_engine();
            let mut limits = HashMap::new();

            for order in orders {
                limits.insert(order.id, order.price);
                for fill in engine.submit_order(order).unwrap() {
                    let sell_price = limits[&fill.sell_order.id];
                    let buy_price = limits[&fill.buy_order.id];
                    prop_assert_eq!(fill.price, Price::midpoint(buy_price, sell_price));
                    prop_assert!(sell_price <= fill.price && fill.price <= buy_price);
                    prop_assert!(fill.quantity > 0);
                    prop_assert!(fill.sell_order.quantity >= 0);
                    prop_assert!(fill.buy_order.quantity >= 0);
                }
            }
        }

        /// Invariant: filled plus resting quantity equals submitted quantity.
        #[test]
        fn fuzz_quantity_conservation(orders in prop::collection::vec(order_strategy(), 1..60)) {
            let mut engine = running_engine();
            let mut submitted: Quantity = 0;
            let mut filled: Quantity = 0;

            for order in orders {
                submitted += order.quantity;
                for fill in engine.submit_order(order).unwrap() {
                    filled += 2 * fill.quantity;
                }
            }

            let resting: Quantity = engine
                .book()
                .asks()
                .orders()
                .chain(engine.book().bids().orders())
                .map(|o| o.quantity)
                .sum();
            prop_assert_eq!(submitted, filled + resting);
        }

        /// Property: cancelling a resting id removes exactly that order;
        /// cancelling an unknown id leaves the book untouched.
        #[test]
        fn fuzz_cancel_protocol(
            orders in prop::collection::vec(order_strategy(), 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut engine = running_engine();
            let requester = ParticipantId::next();
            for order in orders {
                engine.submit_order(order).unwrap();
            }

            let before: Vec<OrderId> = engine
                .book()
                .asks()
                .orders()
                .chain(engine.book().bids().orders())
                .map(|o| o.id)
                .collect();

            prop_assert_eq!(engine.cancel_order(OrderId::new(), requester), Some(false));
            prop_assert_eq!(engine.book().order_count(), before.len());

            if !before.is_empty() {
                let target = before[pick.index(before.len())];
                prop_assert_eq!(engine.cancel_order(target, requester), Some(true));
                prop_assert!(!engine.book().contains(&target));
                prop_assert_eq!(engine.book().order_count(), before.len() - 1);
            }
        }
    }
}
