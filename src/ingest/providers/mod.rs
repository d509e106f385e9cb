pub mod csv_file;
pub mod openweathermap;
pub mod weatherapi;

use anyhow::Result;
use std::time::Duration;

use crate::config::{SourceConfig, SourceKind};
use crate::ingest::types::WeatherSource;

/// Pick the adapter for a descriptor by its kind tag.
pub fn build(cfg: &SourceConfig, request_timeout: Duration) -> Result<Box<dyn WeatherSource>> {
    Ok(match cfg.kind {
        SourceKind::Csv => Box::new(csv_file::CsvFileSource::from_config(cfg)),
        SourceKind::OpenWeatherMap => Box::new(openweathermap::OpenWeatherMapSource::from_config(
            cfg,
            request_timeout,
        )?),
        SourceKind::WeatherApi => Box::new(weatherapi::WeatherApiSource::from_config(
            cfg,
            request_timeout,
        )?),
    })
}
