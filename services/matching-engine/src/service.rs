//! Engine task and its handle
//!
//! `spawn` moves a `MatchingEngine` onto its own tokio task, which drains
//! an unbounded inbox one message at a time. Producers hold a cloneable
//! `EngineHandle`; sending never blocks. The task ends once every handle
//! is dropped and hands the engine back through its `JoinHandle`.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use types::ids::{OrderId, ParticipantId};
use types::order::Order;

use crate::engine::{EngineConfig, EngineMessage, MatchingEngine};
use crate::error::EngineError;
use crate::events::MarketEvent;
use crate::registry::MailboxConfig;

/// Producer side of the engine inbox
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineMessage>,
    mailbox: MailboxConfig,
}

impl EngineHandle {
    fn send(&self, message: EngineMessage) -> Result<(), EngineError> {
        self.tx.send(message).map_err(|_| EngineError::Closed)
    }

    /// Register a new participant and return its mailbox
    pub fn connect(&self) -> Result<(ParticipantId, mpsc::Receiver<MarketEvent>), EngineError> {
        let participant = ParticipantId::next();
        let (mailbox, events) = mpsc::channel(self.mailbox.capacity.max(1));
        self.send(EngineMessage::Connect {
            participant,
            mailbox,
        })?;
        Ok((participant, events))
    }

    pub fn disconnect(&self, participant: ParticipantId) -> Result<(), EngineError> {
        self.send(EngineMessage::Disconnect { participant })
    }

    pub fn submit(&self, order: Order) -> Result<(), EngineError> {
        self.send(EngineMessage::SubmitOrder { order })
    }

    pub fn cancel(&self, id: OrderId, requester: ParticipantId) -> Result<(), EngineError> {
        self.send(EngineMessage::CancelOrder { id, requester })
    }

    pub fn start_round(&self) -> Result<(), EngineError> {
        self.send(EngineMessage::StartRound)
    }

    pub fn stop_round(&self) -> Result<(), EngineError> {
        self.send(EngineMessage::StopRound)
    }

    pub fn get_books(&self, requester: ParticipantId) -> Result<(), EngineError> {
        self.send(EngineMessage::GetBooks { requester })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start the engine task
pub fn spawn(config: EngineConfig) -> (EngineHandle, JoinHandle<MatchingEngine>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = MatchingEngine::new(config);
    let task = tokio::spawn(run(engine, rx));
    let handle = EngineHandle {
        tx,
        mailbox: config.mailbox,
    };
    (handle, task)
}

/// Drain the inbox until every producer is gone
pub async fn run(
    mut engine: MatchingEngine,
    mut inbox: mpsc::UnboundedReceiver<EngineMessage>,
) -> MatchingEngine {
    info!(running = engine.is_running(), "Matching engine started");
    while let Some(message) = inbox.recv().await {
        engine.handle(message);
    }
    info!(
        fills = engine.fills_executed(),
        resting = engine.book().order_count(),
        "Matching engine stopped"
    );
    engine
}
