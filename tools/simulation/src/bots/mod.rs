//! Trading strategies

pub mod passive_arbitrage;
pub mod market_maker;
pub mod noise_trader;

pub use market_maker::{MarketMakerConfig, MarketMakerTrader};
pub use noise_trader::{NoiseTrader, NoiseTraderConfig};
pub use passive_arbitrage::PassiveArbitrageTrader;
