//! Trading agents for the exchange simulator
//!
//! Independent strategies that watch engine broadcasts and submit orders
//! of their own. Each agent owns its state outright; agents interact only
//! through the engine.
//!
//! # Modules
//! - `traits`: the `Trader` capability
//! - `state`: per-agent cash, inventory and order bookkeeping
//! - `shadow_book`: local, non-authoritative book mirror
//! - `bots`: passive arbitrage, market maker and noise strategies
//! - `hft`: shadow-book front end and agent task
//! - `population`: spawning named strategies and noise crowds

pub mod traits;
pub mod state;
pub mod shadow_book;
pub mod bots;
pub mod hft;
pub mod population;

pub use bots::{
    MarketMakerConfig, MarketMakerTrader, NoiseTrader, NoiseTraderConfig, PassiveArbitrageTrader,
};
pub use hft::{HftTrader, Reaction};
pub use population::{spawn_noise_traders, spawn_trader, PopulationConfig, SpawnedTrader, TraderKind};
pub use shadow_book::ShadowBook;
pub use state::TraderState;
pub use traits::Trader;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
