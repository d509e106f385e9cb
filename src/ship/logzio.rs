// src/ship/logzio.rs
use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;

use super::{encode_ndjson, LogShipper, ShipError};
use crate::config::LogzIoConfig;
use crate::ingest::types::UnifiedRecord;

/// POSTs NDJSON batches to a Logz.io listener.
#[derive(Clone)]
pub struct LogzIoShipper {
    host: Option<String>,
    port: u16,
    token: Option<String>,
    scheme: &'static str,
    client: Client,
}

impl LogzIoShipper {
    pub fn new(cfg: &LogzIoConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building logz.io http client")?;
        Ok(Self {
            host: cfg.host.clone().filter(|h| !h.is_empty()),
            port: cfg.port,
            token: cfg.token.clone().filter(|t| !t.is_empty()),
            scheme: "https",
            client,
        })
    }

    /// Plain-HTTP target, for local listeners and tests.
    pub fn with_insecure_http(mut self) -> Self {
        self.scheme = "http";
        self
    }

    pub fn endpoint_url(&self) -> Result<String, ShipError> {
        let host = self.host.as_deref().ok_or(ShipError::MissingEndpoint("host"))?;
        let token = self.token.as_deref().ok_or(ShipError::MissingEndpoint("token"))?;
        Ok(format!("{}://{}:{}/?token={}", self.scheme, host, self.port, token))
    }
}

#[async_trait::async_trait]
impl LogShipper for LogzIoShipper {
    async fn ship(&self, records: &[UnifiedRecord]) -> Result<bool, ShipError> {
        if records.is_empty() {
            return Ok(true);
        }
        let url = self.endpoint_url()?;
        let body = encode_ndjson(records)?;

        tracing::info!(
            records = records.len(),
            host = self.host.as_deref().unwrap_or_default(),
            port = self.port,
            "shipping to logz.io"
        );

        let res = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match res {
            Ok(rsp) if rsp.status() == StatusCode::OK => {
                tracing::info!("logz.io accepted batch");
                Ok(true)
            }
            Ok(rsp) => {
                let status = rsp.status();
                let text = rsp.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %text, "logz.io rejected batch");
                Ok(false)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("timeout while shipping to logz.io");
                Ok(false)
            }
            Err(e) if e.is_connect() => {
                tracing::warn!(error = %e, "connection error while shipping to logz.io");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "request to logz.io failed");
                Ok(false)
            }
        }
    }
}
