//! Matching logic module
//!
//! Implements the price-time priority crossing loop with midpoint strikes

pub mod crossing;
pub mod executor;

pub use crossing::{can_match, strike_price};
pub use executor::MatchExecutor;
