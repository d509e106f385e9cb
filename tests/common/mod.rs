// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use weather_shipper::{LogShipper, RawRecord, ShipError, UnifiedRecord, WeatherSource};

/// What the mock shipper does on a given call.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Fail the first `n` calls, then succeed.
    FailFirst(usize),
    Misconfigured,
    /// Fail the first `n` calls, then never answer.
    HangAfter(usize),
}

#[derive(Clone)]
pub struct MockShipper {
    behavior: Behavior,
    pub calls: Arc<Mutex<Vec<(Instant, Vec<UnifiedRecord>)>>>,
}

impl MockShipper {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl LogShipper for MockShipper {
    async fn ship(&self, records: &[UnifiedRecord]) -> Result<bool, ShipError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), records.to_vec()));
            calls.len()
        };
        match self.behavior {
            Behavior::Succeed => Ok(true),
            Behavior::Fail => Ok(false),
            Behavior::FailFirst(k) => Ok(n > k),
            Behavior::Misconfigured => Err(ShipError::MissingEndpoint("token")),
            Behavior::HangAfter(k) if n > k => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(true)
            }
            Behavior::HangAfter(_) => Ok(false),
        }
    }
}

/// Returns the same raw records on every fetch and counts fetches.
pub struct StaticSource {
    name: &'static str,
    records: Vec<RawRecord>,
    pub fetches: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(name: &'static str, records: Vec<RawRecord>) -> Self {
        Self {
            name,
            records,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl WeatherSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        self.name
    }
}

pub fn raw(city: &str, temperature: f64, description: &str, provider: &str) -> RawRecord {
    RawRecord::new(provider)
        .with("city", city)
        .with("temperature", temperature)
        .with("description", description)
}
