//! Weather Shipper — Binary Entrypoint
//! Loads configuration, wires sources and the Logz.io shipper, and polls
//! until SIGINT/SIGTERM, then rescues any undelivered data.

use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weather_shipper::metrics::Metrics;
use weather_shipper::{shutdown, AppConfig, Scheduler};

/// Compact human-readable logs by default; `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_shipper=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present; real env vars take precedence.
    let _ = dotenvy::dotenv();
    init_tracing();

    tracing::info!("starting weather shipper");
    let cfg = match AppConfig::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = ?e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        polling_interval = cfg.polling_interval,
        data_sources = cfg.data_sources.len(),
        "configuration loaded"
    );

    // Keep the exporter alive for the whole run.
    let _metrics = if cfg.metrics.enabled {
        match Metrics::init() {
            Ok(m) => {
                if let Err(e) = m.serve(&cfg.metrics.listen_addr).await {
                    tracing::warn!(error = ?e, "metrics endpoint unavailable");
                }
                Some(m)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    let (trigger, listener) = shutdown::channel();
    shutdown::spawn_signal_listener(trigger);

    let mut scheduler = match Scheduler::from_config(&cfg, listener) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = ?e, "failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    let outcome = scheduler.run().await;
    tracing::info!(?outcome, "shutdown complete");
    ExitCode::SUCCESS
}
