//! MATCHDAY — live soccer scoreboard aggregator
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the dashboard, and runs timer-driven refresh cycles until
//! Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use matchday::config;
use matchday::dashboard::{self, routes::DashboardState};
use matchday::engine::orchestrator::AggregationOrchestrator;
use matchday::feed::espn::EspnFeed;
use matchday::types::RefreshOutcome;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("MATCHDAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = if std::path::Path::new(&config_path).exists() {
        config::AppConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        config::AppConfig::default()
    };

    info!(
        sport = %cfg.upstream.sport,
        catalog_limit = cfg.pipeline.catalog_limit,
        max_concurrency = ?cfg.pipeline.max_concurrency,
        interval_secs = cfg.refresh.interval_secs,
        lookback_days = cfg.window.lookback_days,
        lookahead_days = cfg.window.lookahead_days,
        "MATCHDAY starting up"
    );

    // -- Initialise components -------------------------------------------

    let feed = Arc::new(EspnFeed::new(&cfg.upstream)?);
    let orchestrator = Arc::new(AggregationOrchestrator::new(feed, &cfg.pipeline));

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(
            Arc::clone(&orchestrator),
            cfg.window.time_window(),
        ));
        dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;
    }

    // -- Main loop -------------------------------------------------------

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if cfg.refresh.interval_secs == 0 {
        info!("Timer refresh disabled, running one cycle then waiting for manual triggers");
        log_outcome(&orchestrator.refresh().await);
        shutdown.await?;
        info!("Shutdown signal received.");
        return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.refresh.interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(
        interval_secs = cfg.refresh.interval_secs,
        "Entering refresh loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                log_outcome(&orchestrator.refresh().await);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("MATCHDAY shut down cleanly.");
    Ok(())
}

fn log_outcome(outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::Completed(view) => info!(
            cycle_id = %view.cycle_id,
            leagues = view.leagues.len(),
            live_quotes = view.odds_by_event.len(),
            "Snapshot published"
        ),
        RefreshOutcome::Failed(e) => warn!(error = %e, "Cycle failed, continuing to next"),
        RefreshOutcome::Skipped => info!("Previous cycle still running, tick skipped"),
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matchday=info"));

    let json_logging = std::env::var("MATCHDAY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
