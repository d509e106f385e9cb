// src/ingest/providers/openweathermap.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{SourceConfig, SourceKind};
use crate::ingest::types::{RawRecord, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";

#[derive(Debug, Deserialize)]
struct Current {
    name: Option<String>,
    main: Main,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

pub struct OpenWeatherMapSource {
    api_key: Option<String>,
    cities: Vec<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenWeatherMapSource {
    pub fn from_config(cfg: &SourceConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building openweathermap http client")?;
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
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let body: Current = self
            .client
            .get(url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .context("openweathermap get()")?
            .error_for_status()
            .context("openweathermap non-2xx")?
            .json()
            .await
            .context("unexpected openweathermap response format")?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| anyhow!("unexpected openweathermap response format: empty 'weather'"))?;

        Ok(RawRecord::new(SourceKind::OpenWeatherMap.as_str())
            .with("city", body.name.unwrap_or_else(|| city.to_string()))
            .with("temperature", body.main.temp)
            .with("description", description))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("openweathermap source requires 'api_key'"))?;

        let mut out = Vec::with_capacity(self.cities.len());
        for city in &self.cities {
            match self.fetch_city(api_key, city).await {
                Ok(rec) => out.push(rec),
                Err(e) => {
                    tracing::warn!(error = ?e, city = %city, provider = "openweathermap", "city fetch failed");
                    counter!("weather_city_errors_total", "source" => "openweathermap").increment(1);
                }
            }
        }
        counter!("weather_records_fetched_total", "source" => "openweathermap").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        SourceKind::OpenWeatherMap.as_str()
    }
}
