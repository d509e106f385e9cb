// src/ingest/providers/weatherapi.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{SourceConfig, SourceKind};
use crate::ingest::types::{RawRecord, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

pub struct WeatherApiSource {
    api_key: Option<String>,
    cities: Vec<String>,
    base_url: String,
    client: reqwest::Client,
}

impl WeatherApiSource {
    pub fn from_config(cfg: &SourceConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building weatherapi http client")?;
        Ok(Self {
            api_key: cfg.api_key.clone(),
            cities: cfg.cities.clone(),
            base_url: cfg
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }

    async fn fetch_city(&self, api_key: &str, city: &str) -> Result<RawRecord> {
        let url = format!("{}/v1/current.json", self.base_url.trim_end_matches('/'));
        let body: CurrentResponse = self
            .client
            .get(url)
            .query(&[("key", api_key), ("q", city), ("aqi", "no")])
            .send()
            .await
            .context("weatherapi get()")?
            .error_for_status()
            .context("weatherapi non-2xx")?
            .json()
            .await
            .context("unexpected weatherapi response format")?;

        Ok(RawRecord::new(SourceKind::WeatherApi.as_str())
            .with("city", body.location.name)
            .with("temperature", body.current.temp_c)
            .with("description", body.current.condition.text))
    }
}

#[async_trait]
impl WeatherSource for WeatherApiSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("weatherapi source requires 'api_key'"))?;

        let mut out = Vec::with_capacity(self.cities.len());
        for city in &self.cities {
            match self.fetch_city(api_key, city).await {
                Ok(rec) => out.push(rec),
                Err(e) => {
                    tracing::warn!(error = ?e, city = %city, provider = "weatherapi", "city fetch failed");
                    counter!("weather_city_errors_total", "source" => "weatherapi").increment(1);
                }
            }
        }
        counter!("weather_records_fetched_total", "source" => "weatherapi").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        SourceKind::WeatherApi.as_str()
    }
}
