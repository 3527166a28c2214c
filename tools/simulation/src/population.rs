//! Seeding the market with agents
//!
//! Every spawned trader runs behind the HFT front end.

use std::fmt;
use std::str::FromStr;

use matching_engine::{EngineError, EngineHandle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;
use types::ids::ParticipantId;
use types::numeric::Price;

use crate::bots::{
    MarketMakerConfig, MarketMakerTrader, NoiseTrader, NoiseTraderConfig, PassiveArbitrageTrader,
};
use crate::hft::HftTrader;

/// Strategy names accepted by `startTrader`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraderKind {
    Arbitrage,
    MarketMaker,
    Noise,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown trader kind: {0}")]
pub struct UnknownTraderKind(pub String);

impl FromStr for TraderKind {
    type Err = UnknownTraderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arbitrage" | "simple" | "hft" => Ok(TraderKind::Arbitrage),
            "market-maker" | "marketmaker" | "market_maker" => Ok(TraderKind::MarketMaker),
            "noise" => Ok(TraderKind::Noise),
            _ => Err(UnknownTraderKind(s.to_string())),
        }
    }
}

impl fmt::Display for TraderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraderKind::Arbitrage => "arbitrage",
            TraderKind::MarketMaker => "market-maker",
            TraderKind::Noise => "noise",
        };
        f.write_str(name)
    }
}

/// Parameters shared by every seeded agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationConfig {
    pub fair_value: Price,
    pub market_maker: MarketMakerConfig,
    pub noise: NoiseTraderConfig,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            fair_value: Price::from_u64(100),
            market_maker: MarketMakerConfig::default(),
            noise: NoiseTraderConfig::default(),
        }
    }
}

/// A detached running agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedTrader {
    pub participant: ParticipantId,
    pub kind: TraderKind,
}

/// Spawn one named strategy. The task runs detached until the round stops.
pub fn spawn_trader<R: Rng>(
    kind: TraderKind,
    config: &PopulationConfig,
    engine: &EngineHandle,
    rng: &mut R,
) -> Result<SpawnedTrader, EngineError> {
    let seed = rng.gen();
    let participant = match kind {
        TraderKind::Arbitrage => {
            let trader = PassiveArbitrageTrader::new(config.fair_value, seed);
            HftTrader::new(trader).spawn(engine.clone())?.0
        }
        TraderKind::MarketMaker => {
            let trader = MarketMakerTrader::new(
                PassiveArbitrageTrader::new(config.fair_value, seed),
                config.market_maker,
            );
            HftTrader::new(trader).spawn(engine.clone())?.0
        }
        TraderKind::Noise => {
            let trader = NoiseTrader::new(0, config.fair_value, config.noise, seed);
            HftTrader::new(trader).spawn(engine.clone())?.0
        }
    };
    Ok(SpawnedTrader { participant, kind })
}

/// Spawn `n` noise traders with seeds drawn from `rng`
pub fn spawn_noise_traders<R: Rng>(
    n: usize,
    config: &PopulationConfig,
    engine: &EngineHandle,
    rng: &mut R,
) -> Result<Vec<JoinHandle<NoiseTrader>>, EngineError> {
    let mut tasks = Vec::with_capacity(n);
    for id in 0..n {
        let trader = NoiseTrader::new(id, config.fair_value, config.noise, rng.gen());
        let (_, task) = HftTrader::new(trader).spawn(engine.clone())?;
        tasks.push(task);
    }
    info!(count = n, "Noise traders spawned");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trader_kind_parsing() {
        assert_eq!("arbitrage".parse::<TraderKind>(), Ok(TraderKind::Arbitrage));
        assert_eq!("Market-Maker".parse::<TraderKind>(), Ok(TraderKind::MarketMaker));
        assert_eq!("marketmaker".parse::<TraderKind>(), Ok(TraderKind::MarketMaker));
        assert_eq!(" noise ".parse::<TraderKind>(), Ok(TraderKind::Noise));
        assert_eq!(
            "whale".parse::<TraderKind>(),
            Err(UnknownTraderKind("whale".to_string()))
        );
    }

    #[test]
    fn test_trader_kind_display_round_trips() {
        for kind in [TraderKind::Arbitrage, TraderKind::MarketMaker, TraderKind::Noise] {
            assert_eq!(kind.to_string().parse::<TraderKind>(), Ok(kind));
        }
    }
}
