//! Error types shared across the exchange
//!
//! Error taxonomy using thiserror

use thiserror::Error;

use crate::numeric::Quantity;

/// A client payload that cannot be turned into an engine message
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request carries no recognised command")]
    Empty,

    #[error("Request carries {count} commands, expected exactly one")]
    Ambiguous { count: usize },
}

/// Order-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(Quantity),

    #[error("Fill of {fill} exceeds remaining quantity {remaining}")]
    Overfill { fill: Quantity, remaining: Quantity },
}
