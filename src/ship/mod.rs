// src/ship/mod.rs
pub mod logzio;

use metrics::counter;
use std::time::Duration;
use thiserror::Error;

use crate::config::NetworkConfig;
use crate::ingest::types::UnifiedRecord;

pub use logzio::LogzIoShipper;

#[derive(Debug, Error)]
pub enum ShipError {
    /// The shipping target is unusable; retrying cannot help.
    #[error("shipping endpoint misconfigured: missing {0}")]
    MissingEndpoint(&'static str),
    #[error("serializing records: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Delivery of one batch. `Ok(false)` means the remote refused it or could not
/// be reached; `Err` is reserved for problems a retry will not fix.
#[async_trait::async_trait]
pub trait LogShipper: Send + Sync {
    async fn ship(&self, records: &[UnifiedRecord]) -> Result<bool, ShipError>;
}

/// Newline-delimited JSON, one record per line, no trailing newline.
pub fn encode_ndjson(records: &[UnifiedRecord]) -> Result<String, serde_json::Error> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_base: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn from_network(net: &NetworkConfig) -> Self {
        Self {
            attempts: net.retry_attempts,
            delay_base: net.retry_delay_base,
        }
    }

    /// Pause after failed attempt `attempt` (1-based): `base^attempt` seconds.
    /// Saturates instead of overflowing; a negative or NaN base means no pause.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.delay_base.powi(exp);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Ship with up to `policy.attempts` tries and exponential backoff.
/// Returns `Ok(false)` once every attempt has failed; the caller keeps the data.
pub async fn ship_with_retry(
    shipper: &dyn LogShipper,
    records: &[UnifiedRecord],
    policy: &RetryPolicy,
) -> Result<bool, ShipError> {
    if records.is_empty() {
        tracing::debug!("no data to ship");
        return Ok(true);
    }

    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        tracing::info!(attempt, of = attempts, records = records.len(), "shipping attempt");
        counter!("weather_ship_attempts_total").increment(1);

        if shipper.ship(records).await? {
            return Ok(true);
        }

        if attempt < attempts {
            let delay = policy.delay_after(attempt);
            tracing::info!(delay_secs = delay.as_secs_f64(), "waiting before retry");
            tokio::time::sleep(delay).await;
        }
    }

    tracing::error!(attempts, records = records.len(), "all shipping attempts failed");
    counter!("weather_ship_failures_total").increment(1);
    Ok(false)
}
