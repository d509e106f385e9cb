// src/config/app.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::overrides::apply_env_overrides;

pub const ENV_CONFIG_PATH: &str = "WEATHER_SHIPPER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

fn default_polling_interval() -> u64 {
    60
}
fn default_enabled() -> bool {
    true
}
fn default_logz_port() -> u16 {
    8071
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay_base() -> f64 {
    2.0
}
fn default_request_timeout() -> u64 {
    15
}
fn default_ship_timeout() -> u64 {
    30
}
fn default_shutdown_timeout() -> f64 {
    30.0
}
fn default_recovery_file() -> PathBuf {
    PathBuf::from("./unsent_data.jsonl")
}
fn default_metrics_addr() -> String {
    "0.0.0.0:9108".to_string()
}

/// Root configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between the end of one cycle and the start of the next.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
    pub data_sources: Vec<SourceConfig>,
    pub logz_io: LogzIoConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub application: ApplicationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    OpenWeatherMap,
    WeatherApi,
}

impl SourceKind {
    /// Tag stamped into `source_provider` of every raw record.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::OpenWeatherMap => "openweathermap",
            SourceKind::WeatherApi => "weatherapi",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `data_sources`. Kind-specific fields are optional here;
/// the adapter for the kind decides which ones it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// csv
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// openweathermap / weatherapi
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    /// Override for the API root, e.g. a local mirror.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl SourceConfig {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            enabled: true,
            file_path: None,
            api_key: None,
            cities: Vec::new(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogzIoConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_logz_port")]
    pub port: u16,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for LogzIoConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_logz_port(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_base")]
    /// Backoff after attempt `n` is `retry_delay_base^n` seconds; may be fractional.
    pub retry_delay_base: f64,
    /// Seconds; applies to source fetches.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Seconds; applies to each shipping POST.
    #[serde(default = "default_ship_timeout")]
    pub ship_timeout: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_base: default_retry_delay_base(),
            request_timeout: default_request_timeout(),
            ship_timeout: default_ship_timeout(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn ship_timeout(&self) -> Duration {
        Duration::from_secs(self.ship_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_shutdown_timeout")]
    /// Seconds; may be fractional.
    pub shutdown_timeout: f64,
    #[serde(default)]
    pub persist_on_shutdown: bool,
    #[serde(default = "default_recovery_file")]
    pub recovery_file: PathBuf,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: default_shutdown_timeout(),
            persist_on_shutdown: false,
            recovery_file: default_recovery_file(),
        }
    }
}

impl ApplicationConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.shutdown_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_addr")]
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_metrics_addr(),
        }
    }
}

impl AppConfig {
    /// Parse YAML text without touching the environment.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = serde_yaml::from_str(s).context("parsing config yaml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read the YAML file at `path`, then apply env overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg = Self::from_yaml_str(&content)
            .with_context(|| format!("loading config from {}", path.display()))?;
        apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Load using `$WEATHER_SHIPPER_CONFIG`, falling back to `config/config.yaml`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(path)
    }

    fn validate(&self) -> Result<()> {
        if self.polling_interval == 0 {
            bail!("polling_interval must be at least 1 second");
        }
        if !(self.network.retry_delay_base.is_finite() && self.network.retry_delay_base >= 0.0) {
            bail!("network.retry_delay_base must be a non-negative number");
        }
        if !(self.application.shutdown_timeout.is_finite() && self.application.shutdown_timeout >= 0.0) {
            bail!("application.shutdown_timeout must be a non-negative number of seconds");
        }
        for (i, s) in self.data_sources.iter().enumerate() {
            if s.kind == SourceKind::Csv && s.enabled && s.file_path.is_none() {
                tracing::warn!(index = i, "csv source has no file_path; it will fail every cycle");
            }
        }
        Ok(())
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.data_sources.iter().filter(|s| s.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
polling_interval: 30
data_sources:
  - type: csv
    enabled: true
    file_path: ./data/weather.csv
  - type: openweathermap
    api_key: abc
    cities: [Berlin, London]
  - type: weatherapi
    enabled: false
    cities: [Paris]
logz_io:
  host: listener.logz.io
  port: 8071
  token: tok
network:
  retry_attempts: 5
  retry_delay_base: 3
  request_timeout: 10
application:
  shutdown_timeout: 20
  persist_on_shutdown: true
  recovery_file: /tmp/unsent.jsonl
"#;

    #[test]
    fn parses_full_document() {
        let cfg = AppConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(cfg.polling_interval, 30);
        assert_eq!(cfg.data_sources.len(), 3);
        assert_eq!(cfg.data_sources[0].kind, SourceKind::Csv);
        assert_eq!(cfg.data_sources[1].kind, SourceKind::OpenWeatherMap);
        assert!(cfg.data_sources[1].enabled, "enabled defaults to true");
        assert!(!cfg.data_sources[2].enabled);
        assert_eq!(cfg.enabled_sources().count(), 2);
        assert_eq!(cfg.network.retry_attempts, 5);
        assert_eq!(cfg.network.ship_timeout, 30);
        assert!(cfg.application.persist_on_shutdown);
        assert_eq!(cfg.application.recovery_file, PathBuf::from("/tmp/unsent.jsonl"));
        assert!(!cfg.metrics.enabled);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let cfg = AppConfig::from_yaml_str("data_sources: []\nlogz_io: {}\n").unwrap();
        assert_eq!(cfg.polling_interval, 60);
        assert_eq!(cfg.logz_io.port, 8071);
        assert_eq!(cfg.network.retry_attempts, 3);
        assert_eq!(cfg.network.retry_delay_base, 2.0);
        assert_eq!(cfg.network.request_timeout, 15);
        assert_eq!(cfg.application.shutdown_timeout, 30.0);
        assert!(!cfg.application.persist_on_shutdown);
    }

    #[test]
    fn missing_required_keys_fail() {
        assert!(AppConfig::from_yaml_str("polling_interval: 5\nlogz_io: {}\n").is_err());
        assert!(AppConfig::from_yaml_str("data_sources: []\n").is_err());
    }

    #[test]
    fn fractional_backoff_and_timeout_are_accepted() {
        let y = "data_sources: []\nlogz_io: {}\nnetwork:\n  retry_delay_base: 1.5\napplication:\n  shutdown_timeout: 2.5\n";
        let cfg = AppConfig::from_yaml_str(y).unwrap();
        assert_eq!(cfg.network.retry_delay_base, 1.5);
        assert_eq!(cfg.application.shutdown_timeout(), Duration::from_millis(2500));

        let y = "data_sources: []\nlogz_io: {}\nnetwork:\n  retry_delay_base: -2\n";
        assert!(AppConfig::from_yaml_str(y).is_err());
    }

    #[test]
    fn unknown_source_type_fails() {
        let y = "data_sources:\n  - type: ftp\nlogz_io: {}\n";
        assert!(AppConfig::from_yaml_str(y).is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let y = "polling_interval: 0\ndata_sources: []\nlogz_io: {}\n";
        assert!(AppConfig::from_yaml_str(y).is_err());
    }
}
