mod config;
mod error;
mod handlers;
mod logging;
mod router;
mod state;

use std::time::Duration;

use anyhow::{Context, Result};
use crate::config::ExchangeConfig;
use matching_engine::EngineHandle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use router::create_router;
use simulation::{TraderKind, spawn_noise_traders, spawn_trader};
use state::AppState;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// How long agents get to leave after the final round stop
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let config = ExchangeConfig::load()?;
    logging::init_tracing(config.json_logs)?;

    if config.simulate > 0 {
        run_headless(&config).await
    } else {
        serve(&config).await
    }
}

/// Engine plus agents, no network. Runs until interrupted.
async fn run_headless(config: &ExchangeConfig) -> Result<()> {
    info!(noise_traders = config.simulate, "Starting headless simulation");

    let (engine, task) = matching_engine::spawn(config.engine_config(true));
    seed_market(&engine, config, config.simulate)?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutting down simulation");

    engine.stop_round()?;
    drop(engine);

    match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
        Ok(Ok(engine)) => info!(
            fills = engine.fills_executed(),
            resting = engine.book().order_count(),
            "Simulation finished"
        ),
        Ok(Err(err)) => error!(error = %err, "Matching engine task failed"),
        Err(_) => warn!("Agents did not leave in time"),
    }
    Ok(())
}

/// Websocket participants on a port. Agents join after a start-up delay.
async fn serve(config: &ExchangeConfig) -> Result<()> {
    info!("Starting exchange gateway");

    let (engine, _task) = matching_engine::spawn(config.engine_config(false));
    let app = create_router(AppState::new(engine.clone(), config.population()));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    let seeding = {
        let config = config.clone();
        tokio::spawn(async move {
            tokio::time::sleep(config.seed_delay()).await;
            if let Err(err) = seed_market(&engine, &config, config.seed_noise_traders) {
                error!(error = %err, "Failed to seed agents");
            }
        })
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    seeding.abort();
    info!("Gateway stopped");
    Ok(())
}

/// One informed strategy and a crowd of noise traders
fn seed_market(engine: &EngineHandle, config: &ExchangeConfig, noise_traders: usize) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(rand::random());
    let population = config.population();

    let kind = if config.use_market_maker {
        TraderKind::MarketMaker
    } else {
        TraderKind::Arbitrage
    };
    let seeded = spawn_trader(kind, &population, engine, &mut rng)?;
    info!(participant = %seeded.participant, kind = %seeded.kind, "Seeded informed trader");

    // Detached: agents leave when the round stops
    spawn_noise_traders(noise_traders, &population, engine, &mut rng)?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
}
