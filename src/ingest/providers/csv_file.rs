// src/ingest/providers/csv_file.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use std::path::PathBuf;

use crate::config::{SourceConfig, SourceKind};
use crate::ingest::types::{RawRecord, WeatherSource};

/// Reads `city,temperature,description` rows from a local CSV file.
/// Every column is passed through as a string; validation happens later.
pub struct CsvFileSource {
    file_path: Option<PathBuf>,
    provider: &'static str,
}

impl CsvFileSource {
    pub fn from_config(cfg: &SourceConfig) -> Self {
        Self {
            file_path: cfg.file_path.clone(),
            provider: cfg.kind.as_str(),
        }
    }

    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            file_path: Some(path.into()),
            provider: SourceKind::Csv.as_str(),
        }
    }

    fn parse_rows(&self, bytes: &[u8]) -> Result<Vec<RawRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(bytes);
        let headers = rdr.headers().context("reading csv header")?.clone();

        let mut out = Vec::new();
        for row in rdr.records() {
            let row = row.context("reading csv row")?;
            let mut rec = RawRecord::default();
            for (h, v) in headers.iter().zip(row.iter()) {
                rec.insert(h, v);
            }
            rec.insert(crate::ingest::types::SOURCE_PROVIDER_KEY, self.provider);
            out.push(rec);
        }
        Ok(out)
    }
}

#[async_trait]
impl WeatherSource for CsvFileSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let path = self
            .file_path
            .as_ref()
            .ok_or_else(|| anyhow!("csv source requires 'file_path' in configuration"))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading csv file {}", path.display()))?;
        let out = self
            .parse_rows(&bytes)
            .with_context(|| format!("parsing csv file {}", path.display()))?;
        counter!("weather_records_fetched_total", "source" => self.provider).increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        self.provider
    }
}
