//! Types library for the double-auction exchange simulator
//!
//! Core type definitions shared by the matching engine, the trading agents
//! and the websocket gateway.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, ParticipantId)
//! - `numeric`: Fixed-point price type and quantity alias
//! - `order`: Order record and side
//! - `protocol`: Client request wire format
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod protocol;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::protocol::*;
    pub use crate::errors::*;
}
