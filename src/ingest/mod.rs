// src/ingest/mod.rs
pub mod normalize;
pub mod providers;
pub mod types;

use crate::config::AppConfig;
use crate::ingest::types::{RawRecord, WeatherSource};
use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

pub use normalize::{normalize, normalize_record, validate, ValidationError};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "weather_records_fetched_total",
            "Raw records returned by source adapters."
        );
        describe_counter!(
            "weather_source_errors_total",
            "Source fetches that failed as a whole."
        );
        describe_counter!(
            "weather_city_errors_total",
            "Per-city API failures inside a remote source."
        );
        describe_counter!(
            "weather_records_dropped_total",
            "Raw records rejected by normalization."
        );
        describe_counter!("weather_ship_attempts_total", "Shipping POST attempts.");
        describe_counter!(
            "weather_ship_failures_total",
            "Batches that failed after all retries."
        );
        describe_gauge!(
            "weather_pending_records",
            "Records waiting in the pending buffer."
        );
        describe_gauge!(
            "weather_last_cycle_ts",
            "Unix ts when the last polling cycle started."
        );
    });
}

/// Fetches from every enabled source in declared order, one at a time.
pub struct Aggregator {
    sources: Vec<Box<dyn WeatherSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn WeatherSource>>) -> Self {
        Self { sources }
    }

    /// Build adapters for the enabled descriptors. A descriptor whose adapter
    /// cannot even be constructed is logged and left out.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let timeout = cfg.network.request_timeout();
        let mut sources = Vec::new();
        for sc in cfg.enabled_sources() {
            match providers::build(sc, timeout) {
                Ok(s) => sources.push(s),
                Err(e) => tracing::warn!(error = ?e, source = %sc.kind, "cannot build source"),
            }
        }
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub async fn fetch_all(&self) -> Vec<RawRecord> {
        fetch_all(&self.sources).await
    }
}

/// Run every source once. Failures are logged and skipped; the result is
/// the concatenation of the successful outputs, possibly empty.
pub async fn fetch_all(sources: &[Box<dyn WeatherSource>]) -> Vec<RawRecord> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for s in sources {
        match s.fetch().await {
            Ok(mut v) => {
                tracing::info!(provider = s.name(), records = v.len(), "fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = s.name(), "source fetch failed");
                counter!("weather_source_errors_total").increment(1);
            }
        }
    }
    raw
}
