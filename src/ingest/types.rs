// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SOURCE_PROVIDER_KEY: &str = "source_provider";

/// Source-native observation: loosely typed fields, shape varies by source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(source_provider: &str) -> Self {
        let mut rec = Self::default();
        rec.insert(SOURCE_PROVIDER_KEY, source_provider);
        rec
    }

    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn source_provider(&self) -> Option<&str> {
        self.get(SOURCE_PROVIDER_KEY).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(m: Map<String, Value>) -> Self {
        Self(m)
    }
}

/// Normalized observation, the only shape that leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    city: String,
    temperature_celsius: f64,
    description: String,
    source_provider: String,
}

impl UnifiedRecord {
    /// Trims the string fields. Emptiness and finiteness are the normalizer's job.
    pub fn new(city: &str, temperature_celsius: f64, description: &str, source_provider: &str) -> Self {
        Self {
            city: city.trim().to_string(),
            temperature_celsius,
            description: description.trim().to_string(),
            source_provider: source_provider.trim().to_string(),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source_provider(&self) -> &str {
        &self.source_provider
    }
}

/// Uniform fetch contract implemented once per source kind.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &str;
}
