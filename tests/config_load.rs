// tests/config_load.rs
use std::{env, fs};
use weather_shipper::config::app::ENV_CONFIG_PATH;
use weather_shipper::config::SourceKind;
use weather_shipper::AppConfig;

const YAML: &str = r#"
polling_interval: 45
data_sources:
  - type: openweathermap
    cities: [Berlin]
  - type: weatherapi
    api_key: file-key
    cities: [Paris]
logz_io:
  host: file-host
  port: 8071
network:
  retry_attempts: 2
application:
  persist_on_shutdown: true
"#;

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AppConfig::load_from(dir.path().join("nope.yaml")).is_err());
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.yaml");
    fs::write(&p, "data_sources: [\n  - type: csv\nlogz_io: {").unwrap();
    assert!(AppConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn load_applies_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("config.yaml");
    fs::write(&p, YAML).unwrap();

    env::set_var("OPENWEATHER_API_KEY", "owm-from-env");
    env::remove_var("WEATHERAPI_API_KEY");
    env::set_var("LOGZ_IO_TOKEN", "token-from-env");
    env::remove_var("LOGZ_IO_HOST");

    let cfg = AppConfig::load_from(&p).unwrap();

    env::remove_var("OPENWEATHER_API_KEY");
    env::remove_var("LOGZ_IO_TOKEN");

    assert_eq!(cfg.polling_interval, 45);
    assert_eq!(cfg.data_sources[0].kind, SourceKind::OpenWeatherMap);
    assert_eq!(cfg.data_sources[0].api_key.as_deref(), Some("owm-from-env"));
    assert_eq!(cfg.data_sources[1].api_key.as_deref(), Some("file-key"));
    assert_eq!(cfg.logz_io.token.as_deref(), Some("token-from-env"));
    assert_eq!(cfg.logz_io.host.as_deref(), Some("file-host"));
    assert_eq!(cfg.network.retry_attempts, 2);
    assert_eq!(cfg.network.retry_delay_base, 2.0);
}

#[serial_test::serial]
#[test]
fn load_default_honours_env_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("elsewhere.yaml");
    fs::write(&p, YAML).unwrap();

    env::set_var(ENV_CONFIG_PATH, p.display().to_string());
    let cfg = AppConfig::load_default();
    env::remove_var(ENV_CONFIG_PATH);

    assert_eq!(cfg.unwrap().polling_interval, 45);
}
