//! Error types for the matching engine

use thiserror::Error;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

/// Failure to reach the engine task
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Matching engine is no longer accepting messages")]
    Closed,
}

/// Policy rejection of a submission. Rejected orders are dropped silently:
/// no book mutation and no broadcast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("Round is not running")]
    NotRunning,

    #[error("Non-positive quantity: {0}")]
    NonPositiveQuantity(Quantity),

    #[error("Quantity above limit: {0}")]
    QuantityTooLarge(Quantity),

    #[error("Price out of range: {0}")]
    PriceOutOfRange(Price),

    #[error("Order id already resting: {0}")]
    DuplicateId(OrderId),
}
