// src/scheduler.rs
//! Polling loop and lifecycle: Initializing → Running → ShuttingDown → Stopped.
//!
//! One cycle runs to completion before the next begins. A shutdown request
//! is only observed between cycles, at one-second granularity while sleeping.

use anyhow::{Context, Result};
use metrics::gauge;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::AppConfig;
use crate::ingest::{self, Aggregator};
use crate::pending::PendingBuffer;
use crate::ship::{ship_with_retry, LogShipper, LogzIoShipper, RetryPolicy};
use crate::shutdown::ShutdownListener;

const SLEEP_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing fetched, or nothing survived normalization.
    NoData,
    Shipped(usize),
    /// Delivery failed; the batch went to the pending buffer.
    Retained(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    NothingPending,
    Delivered(usize),
    Persisted { records: usize, path: PathBuf },
    Discarded(usize),
    PersistFailed(usize),
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub polling_interval: Duration,
    pub retry: RetryPolicy,
    pub shutdown_timeout: Duration,
    pub persist_on_shutdown: bool,
    pub recovery_file: PathBuf,
}

impl SchedulerSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            polling_interval: Duration::from_secs(cfg.polling_interval),
            retry: RetryPolicy::from_network(&cfg.network),
            shutdown_timeout: cfg.application.shutdown_timeout(),
            persist_on_shutdown: cfg.application.persist_on_shutdown,
            recovery_file: cfg.application.recovery_file.clone(),
        }
    }
}

pub struct Scheduler {
    settings: SchedulerSettings,
    aggregator: Aggregator,
    shipper: Box<dyn LogShipper>,
    pending: PendingBuffer,
    state: LifecycleState,
    shutdown: ShutdownListener,
}

impl Scheduler {
    pub fn new(
        settings: SchedulerSettings,
        aggregator: Aggregator,
        shipper: Box<dyn LogShipper>,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            settings,
            aggregator,
            shipper,
            pending: PendingBuffer::new(),
            state: LifecycleState::Initializing,
            shutdown,
        }
    }

    /// Wire the configured sources and the Logz.io shipper.
    pub fn from_config(cfg: &AppConfig, shutdown: ShutdownListener) -> Result<Self> {
        let aggregator = Aggregator::from_config(cfg);
        let shipper = LogzIoShipper::new(&cfg.logz_io, cfg.network.ship_timeout())
            .context("building shipper")?;
        Ok(Self::new(
            SchedulerSettings::from_config(cfg),
            aggregator,
            Box::new(shipper),
            shutdown,
        ))
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn pending(&self) -> &PendingBuffer {
        &self.pending
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::info!(from = ?self.state, to = ?next, "lifecycle transition");
        self.state = next;
    }

    /// One fetch → normalize → ship pass. A failed shipment is retained;
    /// an `Err` means the batch was retained but the shipper itself is broken.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let started = chrono::Utc::now();
        tracing::info!(at = %started.format("%Y-%m-%d %H:%M:%S"), "starting polling cycle");
        gauge!("weather_last_cycle_ts").set(started.timestamp() as f64);

        let raw = self.aggregator.fetch_all().await;
        if raw.is_empty() {
            tracing::info!("no data fetched this cycle");
            return Ok(CycleOutcome::NoData);
        }

        let records = ingest::normalize(raw);
        if records.is_empty() {
            tracing::warn!("no valid data after transformation");
            return Ok(CycleOutcome::NoData);
        }
        tracing::info!(records = records.len(), "transformed records");

        match ship_with_retry(self.shipper.as_ref(), &records, &self.settings.retry).await {
            Ok(true) => {
                tracing::info!(records = records.len(), "polling cycle completed");
                Ok(CycleOutcome::Shipped(records.len()))
            }
            Ok(false) => {
                let n = records.len();
                self.pending.extend(records);
                tracing::warn!(records = n, pending = self.pending.len(), "shipping failed, data kept for retry");
                Ok(CycleOutcome::Retained(n))
            }
            Err(e) => {
                self.pending.extend(records);
                Err(anyhow::Error::new(e).context("shipping batch"))
            }
        }
    }

    /// Sleep the polling interval in one-second steps. Returns true when a
    /// shutdown was requested.
    async fn sleep_interval(&self) -> bool {
        let mut left = self.settings.polling_interval;
        while !left.is_zero() {
            if self.shutdown.is_requested() {
                return true;
            }
            let step = left.min(SLEEP_STEP);
            tokio::time::sleep(step).await;
            left -= step;
        }
        self.shutdown.is_requested()
    }

    /// Drive cycles until shutdown is requested, then rescue pending data.
    pub async fn run(&mut self) -> ShutdownOutcome {
        self.transition(LifecycleState::Running);
        tracing::info!(
            interval_secs = self.settings.polling_interval.as_secs(),
            sources = self.aggregator.len(),
            "starting continuous polling"
        );
        if self.aggregator.is_empty() {
            tracing::warn!("no enabled data sources; cycles will fetch nothing");
        }

        while !self.shutdown.is_requested() {
            match self.run_cycle().await {
                Ok(outcome) => tracing::debug!(?outcome, "cycle done"),
                Err(e) => tracing::error!(error = ?e, "error in polling cycle"),
            }
            if self.sleep_interval().await {
                break;
            }
        }

        self.transition(LifecycleState::ShuttingDown);
        let outcome = self.shutdown_rescue().await;
        self.transition(LifecycleState::Stopped);
        outcome
    }

    /// Last delivery attempt for pending data, bounded by the shutdown
    /// timeout; falls back to the recovery file when persistence is on.
    pub async fn shutdown_rescue(&mut self) -> ShutdownOutcome {
        if self.pending.is_empty() {
            tracing::info!("no pending data at shutdown");
            return ShutdownOutcome::NothingPending;
        }
        let n = self.pending.len();
        tracing::info!(records = n, "attempting to send pending records");

        let attempt = tokio::time::timeout(
            self.settings.shutdown_timeout,
            ship_with_retry(self.shipper.as_ref(), self.pending.records(), &self.settings.retry),
        )
        .await;

        let delivered = match attempt {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => {
                tracing::warn!("could not send pending data");
                false
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "error during graceful shutdown");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.settings.shutdown_timeout.as_secs_f64(),
                    "shutdown delivery timed out"
                );
                false
            }
        };

        if delivered {
            self.pending.drain();
            tracing::info!(records = n, "pending data sent");
            return ShutdownOutcome::Delivered(n);
        }

        if !self.settings.persist_on_shutdown {
            tracing::warn!(records = n, "persistence disabled, discarding pending data");
            self.pending.drain();
            return ShutdownOutcome::Discarded(n);
        }

        let path = self.settings.recovery_file.clone();
        match self.pending.persist_to(&path).await {
            Ok(records) => {
                tracing::info!(records, path = %path.display(), "saved pending records");
                ShutdownOutcome::Persisted { records, path }
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to save pending data");
                ShutdownOutcome::PersistFailed(n)
            }
        }
    }
}
