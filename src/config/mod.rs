pub mod app;
pub mod overrides;

pub use app::{
    AppConfig, ApplicationConfig, LogzIoConfig, MetricsConfig, NetworkConfig, SourceConfig,
    SourceKind,
};
