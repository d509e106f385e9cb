//! Ships the records a previous run left in the recovery file, then removes it.
//! Usage: `replay_unsent [path]` (defaults to `application.recovery_file`).

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use weather_shipper::pending::read_recovery_file;
use weather_shipper::{ship_with_retry, validate, AppConfig, LogzIoShipper, RetryPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = AppConfig::load_default()?;
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.application.recovery_file.clone());

    if !path.exists() {
        tracing::info!(path = %path.display(), "nothing to replay");
        return Ok(());
    }

    let records = read_recovery_file(&path).await?;
    if !validate(&records) {
        bail!("recovery file {} holds invalid records", path.display());
    }

    let shipper = LogzIoShipper::new(&cfg.logz_io, cfg.network.ship_timeout())?;
    let policy = RetryPolicy::from_network(&cfg.network);
    if !ship_with_retry(&shipper, &records, &policy).await? {
        bail!("could not deliver {} records; file left in place", records.len());
    }

    tokio::fs::remove_file(&path)
        .await
        .with_context(|| format!("removing {}", path.display()))?;
    println!("replayed {} records from {}", records.len(), path.display());
    Ok(())
}
