// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod metrics;
pub mod pending;
pub mod scheduler;
pub mod ship;
pub mod shutdown;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::ingest::types::{RawRecord, UnifiedRecord, WeatherSource};
pub use crate::ingest::{fetch_all, normalize, validate, Aggregator};
pub use crate::pending::PendingBuffer;
pub use crate::scheduler::{LifecycleState, Scheduler, SchedulerSettings, ShutdownOutcome};
pub use crate::ship::{ship_with_retry, LogShipper, LogzIoShipper, RetryPolicy, ShipError};
