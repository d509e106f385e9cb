// src/config/overrides.rs
use super::app::{AppConfig, SourceKind};

pub const ENV_OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_WEATHERAPI_API_KEY: &str = "WEATHERAPI_API_KEY";
pub const ENV_LOGZ_IO_TOKEN: &str = "LOGZ_IO_TOKEN";
pub const ENV_LOGZ_IO_HOST: &str = "LOGZ_IO_HOST";

/// Apply credential/endpoint overrides. `lookup` is `std::env::var` in
/// production; tests pass a closure over a map. Empty values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_OPENWEATHER_API_KEY) {
        set_api_key(cfg, SourceKind::OpenWeatherMap, &key);
    }
    if let Some(key) = get(ENV_WEATHERAPI_API_KEY) {
        set_api_key(cfg, SourceKind::WeatherApi, &key);
    }
    if let Some(token) = get(ENV_LOGZ_IO_TOKEN) {
        cfg.logz_io.token = Some(token);
    }
    if let Some(host) = get(ENV_LOGZ_IO_HOST) {
        cfg.logz_io.host = Some(host);
    }
}

fn set_api_key(cfg: &mut AppConfig, kind: SourceKind, key: &str) {
    let mut hits = 0usize;
    for src in cfg.data_sources.iter_mut().filter(|s| s.kind == kind) {
        src.api_key = Some(key.to_string());
        hits += 1;
    }
    tracing::debug!(source = %kind, sources = hits, "api key injected from env");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> AppConfig {
        AppConfig::from_yaml_str(
            r#"
data_sources:
  - type: openweathermap
    api_key: from-file
  - type: weatherapi
  - type: csv
    file_path: x.csv
logz_io:
  host: file-host
  token: file-token
"#,
        )
        .unwrap()
    }

    #[test]
    fn env_values_win_over_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_OPENWEATHER_API_KEY, "owm-env"),
            (ENV_WEATHERAPI_API_KEY, "wapi-env"),
            (ENV_LOGZ_IO_TOKEN, "tok-env"),
            (ENV_LOGZ_IO_HOST, "host-env"),
        ]);
        let mut cfg = base();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.data_sources[0].api_key.as_deref(), Some("owm-env"));
        assert_eq!(cfg.data_sources[1].api_key.as_deref(), Some("wapi-env"));
        assert_eq!(cfg.data_sources[2].api_key, None);
        assert_eq!(cfg.logz_io.token.as_deref(), Some("tok-env"));
        assert_eq!(cfg.logz_io.host.as_deref(), Some("host-env"));
    }

    #[test]
    fn absent_or_empty_env_keeps_file_values() {
        let mut cfg = base();
        apply_env_overrides(&mut cfg, |k| {
            (k == ENV_LOGZ_IO_TOKEN).then(|| "  ".to_string())
        });
        assert_eq!(cfg.data_sources[0].api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.logz_io.token.as_deref(), Some("file-token"));
        assert_eq!(cfg.logz_io.host.as_deref(), Some("file-host"));
    }
}
