//! Matching Engine Service
//!
//! Price-time priority continuous double auction. A single task owns the
//! order book and the participant registry and applies inbound messages one
//! at a time, so no other component ever needs a lock on market state.
//!
//! **Key Invariants:**
//! - Sell side ascending, buy side descending, FIFO within a price
//! - No crossed book once matching completes
//! - Strike price is the bid/ask midpoint rounded half-up to the cent
//! - Resting quantities are always positive

pub mod book;
pub mod matching;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod service;

pub use engine::{EngineConfig, EngineMessage, EngineStats, MatchingEngine};
pub use error::{EngineError, Rejection};
pub use events::{BookSnapshot, Cancellation, Fill, MarketEvent};
pub use registry::{Delivery, DropPolicy, MailboxConfig, ParticipantRegistry};
pub use service::{spawn, EngineHandle};
