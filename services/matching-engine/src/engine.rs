//! Matching engine core
//!
//! Sole owner of the order book and the participant registry. Every
//! mutation of either happens in `handle`, one message at a time.

use tokio::sync::mpsc;
use tracing::{debug, info};
use types::ids::{OrderId, ParticipantId};
use types::numeric::MAX_QUANTITY;
use types::order::Order;

use crate::book::OrderBook;
use crate::error::Rejection;
use crate::events::{BookSnapshot, Cancellation, Fill, MarketEvent};
use crate::matching::MatchExecutor;
use crate::registry::{MailboxConfig, ParticipantRegistry};

/// Engine construction parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Accept orders immediately instead of waiting for a round to start
    pub start_running: bool,
    pub mailbox: MailboxConfig,
}

/// Inbound message consumed by the engine loop
#[derive(Debug)]
pub enum EngineMessage {
    Connect {
        participant: ParticipantId,
        mailbox: mpsc::Sender<MarketEvent>,
    },
    Disconnect {
        participant: ParticipantId,
    },
    SubmitOrder {
        order: Order,
    },
    CancelOrder {
        id: OrderId,
        requester: ParticipantId,
    },
    StartRound,
    StopRound,
    GetBooks {
        requester: ParticipantId,
    },
}

/// Counters reported at round stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub cancels_found: u64,
    pub cancels_missed: u64,
}

/// Main matching engine
pub struct MatchingEngine {
    book: OrderBook,
    registry: ParticipantRegistry,
    executor: MatchExecutor,
    running: bool,
    stats: EngineStats,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            book: OrderBook::new(),
            registry: ParticipantRegistry::new(config.mailbox.drop_policy),
            executor: MatchExecutor::new(),
            running: config.start_running,
            stats: EngineStats::default(),
        }
    }

    /// Apply one inbound message to completion
    pub fn handle(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Connect {
                participant,
                mailbox,
            } => self.registry.connect(participant, mailbox),
            EngineMessage::Disconnect { participant } => {
                self.registry.disconnect(participant);
            }
            EngineMessage::SubmitOrder { order } => {
                if let Err(rejection) = self.submit_order(order) {
                    debug!(reason = %rejection, "Order dropped");
                }
            }
            EngineMessage::CancelOrder { id, requester } => {
                self.cancel_order(id, requester);
            }
            EngineMessage::StartRound => self.start_round(),
            EngineMessage::StopRound => self.stop_round(),
            EngineMessage::GetBooks { requester } => self.get_books(requester),
        }
    }

    /// Submit an order to the matching engine
    ///
    /// The order is broadcast as new, inserted, and the book is matched.
    /// Returns the fills produced, which have already been broadcast.
    pub fn submit_order(&mut self, order: Order) -> Result<Vec<Fill>, Rejection> {
        if !self.running {
            self.stats.orders_rejected += 1;
            return Err(Rejection::NotRunning);
        }
        if let Err(rejection) = self.validate(&order) {
            self.stats.orders_rejected += 1;
            return Err(rejection);
        }

        self.stats.orders_accepted += 1;
        debug!(
            order_id = %order.id,
            side = ?order.side,
            price = %order.price,
            quantity = order.quantity,
            "Order accepted"
        );

        self.registry.broadcast(&MarketEvent::NewOrder(order.clone()));
        self.book.insert(order);

        let fills = self.executor.run(&mut self.book);
        for fill in &fills {
            self.registry.broadcast(&MarketEvent::FilledOrder(fill.clone()));
        }
        Ok(fills)
    }

    /// Bounds and identity checks on an incoming order
    fn validate(&self, order: &Order) -> Result<(), Rejection> {
        if order.quantity <= 0 {
            return Err(Rejection::NonPositiveQuantity(order.quantity));
        }
        if order.quantity > MAX_QUANTITY {
            return Err(Rejection::QuantityTooLarge(order.quantity));
        }
        if !order.price.is_tradable() {
            return Err(Rejection::PriceOutOfRange(order.price));
        }
        // A second resting order under the same id would be unreachable
        if self.book.contains(&order.id) {
            return Err(Rejection::DuplicateId(order.id));
        }
        Ok(())
    }

    /// Cancel a resting order
    ///
    /// Returns `None` when the round is stopped and the request is dropped,
    /// otherwise whether the order was still resting.
    pub fn cancel_order(&mut self, id: OrderId, requester: ParticipantId) -> Option<bool> {
        if !self.running {
            debug!(order_id = %id, "Cancel dropped, round not running");
            return None;
        }

        match self.book.remove(&id) {
            Some(order) => {
                self.stats.cancels_found += 1;
                let owner = order.owner.unwrap_or(requester);
                self.registry
                    .send_to(owner, MarketEvent::CancelledOrder(Cancellation::ack(id, true)));
                self.registry
                    .broadcast(&MarketEvent::CancelledOrder(Cancellation::public(id)));
                debug!(order_id = %id, owner = %owner, "Order cancelled");
                Some(true)
            }
            None => {
                self.stats.cancels_missed += 1;
                self.registry
                    .send_to(requester, MarketEvent::CancelledOrder(Cancellation::ack(id, false)));
                debug!(order_id = %id, requester = %requester, "Cancel missed");
                Some(false)
            }
        }
    }

    /// Clear the book and begin accepting orders
    pub fn start_round(&mut self) {
        self.book.clear();
        self.running = true;
        self.stats = EngineStats::default();
        self.executor.reset();
        info!(participants = self.registry.len(), "Round started");
        self.registry.broadcast(&MarketEvent::RoundStarted);
    }

    /// Stop accepting orders; resting orders stay on the book
    pub fn stop_round(&mut self) {
        self.running = false;
        info!(
            orders_accepted = self.stats.orders_accepted,
            orders_rejected = self.stats.orders_rejected,
            fills = self.executor.fills_executed(),
            resting = self.book.order_count(),
            "Round stopped"
        );
        self.registry.broadcast(&MarketEvent::RoundStopped);
    }

    /// Send the requester both sides in priority order
    pub fn get_books(&mut self, requester: ParticipantId) {
        let snapshot = self.snapshot();
        self.registry.send_to(requester, MarketEvent::Books(snapshot));
    }

    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            sell: self.book.asks().orders().cloned().collect(),
            buy: self.book.bids().orders().cloned().collect(),
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn participant_count(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn fills_executed(&self) -> u64 {
        self.executor.fills_executed()
    }
}
