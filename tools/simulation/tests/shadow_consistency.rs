//! Shadow book consistency
//!
//! A shadow book fed every broadcast in order must agree with the engine's
//! book on best bid and best ask.

use matching_engine::{EngineConfig, EngineMessage, MarketEvent, MatchingEngine};
use proptest::prelude::*;
use simulation::ShadowBook;
use tokio::sync::mpsc;
use types::ids::ParticipantId;
use types::numeric::Price;
use types::order::{Order, Side};

#[derive(Debug, Clone)]
enum Action {
    Submit(Order),
    /// Cancel the n-th resting order, if any
    Cancel(usize),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (any::<bool>(), 9_500i64..=10_500, 1i64..=10).prop_map(|(buy, cents, qty)| {
            let side = if buy { Side::Buy } else { Side::Sell };
            Action::Submit(Order::new(side, Price::from_cents(cents), qty))
        }),
        1 => (0usize..50).prop_map(Action::Cancel),
    ]
}

fn apply(book: &mut ShadowBook, event: MarketEvent) {
    match event {
        MarketEvent::NewOrder(order) => book.new_order(&order),
        MarketEvent::FilledOrder(fill) => book.filled(&fill),
        MarketEvent::CancelledOrder(cancellation) if cancellation.cancel.is_none() => {
            book.cancelled(&cancellation.id)
        }
        MarketEvent::RoundStarted => book.clear(),
        _ => {}
    }
}

proptest! {
    #[test]
    fn fuzz_shadow_book_tracks_engine(actions in prop::collection::vec(action_strategy(), 1..80)) {
        let mut engine = MatchingEngine::new(EngineConfig {
            start_running: true,
            ..EngineConfig::default()
        });
        let participant = ParticipantId::next();
        let (mailbox, mut events) = mpsc::channel(100_000);
        engine.handle(EngineMessage::Connect { participant, mailbox });

        let mut shadow = ShadowBook::new();

        for action in actions {
            match action {
                Action::Submit(order) => engine.handle(EngineMessage::SubmitOrder { order }),
                Action::Cancel(n) => {
                    let resting: Vec<_> = engine
                        .book()
                        .asks()
                        .orders()
                        .chain(engine.book().bids().orders())
                        .map(|o| o.id)
                        .collect();
                    if let Some(id) = resting.get(n) {
                        engine.handle(EngineMessage::CancelOrder { id: *id, requester: participant });
                    }
                }
            }

            while let Ok(event) = events.try_recv() {
                apply(&mut shadow, event);
            }

            prop_assert_eq!(shadow.best_bid(), engine.book().best_bid());
            prop_assert_eq!(shadow.best_ask(), engine.book().best_ask());
            prop_assert_eq!(shadow.order_count(), engine.book().order_count());
        }
    }
}
