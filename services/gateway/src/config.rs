//! Layered configuration for the exchange process.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults
//! 2. Environment variable overrides (prefix `EXCHANGE_`, nested with `__`,
//!    e.g. `EXCHANGE_MAILBOX__DROP_POLICY=drop_latest`)

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use matching_engine::{EngineConfig, MailboxConfig};
use serde::Deserialize;
use simulation::{MarketMakerConfig, NoiseTraderConfig, PopulationConfig};
use types::numeric::Price;

/// Top-level process configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Listening port in serve mode.
    pub port: u16,
    /// Number of noise traders for a headless run. Zero means serve mode.
    pub simulate: usize,
    /// Noise traders seeded in serve mode.
    pub seed_noise_traders: usize,
    /// Delay before seeding agents in serve mode.
    pub seed_delay_ms: u64,
    /// Private valuation shared by the seeded strategies.
    pub fair_value: Price,
    /// Seed a market maker instead of a plain arbitrage trader.
    pub use_market_maker: bool,
    pub quiet_period_ms: u64,
    /// Emit JSON logs instead of pretty output.
    pub json_logs: bool,
    pub mailbox: MailboxConfig,
    pub noise: NoiseTraderConfig,
}

impl ExchangeConfig {
    /// Load from defaults and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(Environment::with_prefix("EXCHANGE"))
    }

    fn load_with(environment: Environment) -> Result<Self> {
        let noise = NoiseTraderConfig::default();
        let mailbox = MailboxConfig::default();

        Config::builder()
            .set_default("port", 8008i64)?
            .set_default("simulate", 0i64)?
            .set_default("seed_noise_traders", 100i64)?
            .set_default("seed_delay_ms", 3000i64)?
            .set_default("fair_value", 100i64)?
            .set_default("use_market_maker", false)?
            .set_default("quiet_period_ms", MarketMakerConfig::default().quiet_period_ms as i64)?
            .set_default("json_logs", false)?
            .set_default("mailbox.capacity", mailbox.capacity as i64)?
            .set_default("mailbox.drop_policy", "disconnect")?
            .set_default("noise.min_latency_ms", noise.min_latency_ms as i64)?
            .set_default("noise.max_latency_ms", noise.max_latency_ms as i64)?
            .set_default("noise.min_interval_secs", noise.min_interval_secs as i64)?
            .set_default("noise.max_interval_secs", noise.max_interval_secs as i64)?
            .set_default("noise.price_floor", noise.price_floor.to_string())?
            .set_default("noise.price_ceiling", noise.price_ceiling.to_string())?
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Engine parameters. Headless runs start with the round already open.
    pub fn engine_config(&self, start_running: bool) -> EngineConfig {
        EngineConfig {
            start_running,
            mailbox: self.mailbox,
        }
    }

    pub fn population(&self) -> PopulationConfig {
        PopulationConfig {
            fair_value: self.fair_value,
            market_maker: MarketMakerConfig {
                quiet_period_ms: self.quiet_period_ms,
            },
            noise: self.noise,
        }
    }

    pub fn seed_delay(&self) -> Duration {
        Duration::from_millis(self.seed_delay_ms)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
