// src/pending.rs
use anyhow::{Context, Result};
use metrics::gauge;
use std::path::Path;

use crate::ingest::types::UnifiedRecord;
use crate::ship::encode_ndjson;

/// Records that failed delivery. Grows across cycles; emptied only by a
/// successful ship or by persisting to the recovery file.
#[derive(Debug, Default)]
pub struct PendingBuffer {
    records: Vec<UnifiedRecord>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, batch: Vec<UnifiedRecord>) {
        self.records.extend(batch);
        gauge!("weather_pending_records").set(self.records.len() as f64);
    }

    pub fn records(&self) -> &[UnifiedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empty the buffer after a confirmed delivery.
    pub fn drain(&mut self) -> Vec<UnifiedRecord> {
        gauge!("weather_pending_records").set(0.0);
        std::mem::take(&mut self.records)
    }

    /// Write every record to `path` as NDJSON, replacing whatever was there.
    /// The buffer is only emptied once the write succeeded.
    pub async fn persist_to(&mut self, path: &Path) -> Result<usize> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut body = encode_ndjson(&self.records).context("encoding pending records")?;
        if !body.is_empty() {
            body.push('\n');
        }
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("writing recovery file {}", path.display()))?;
        Ok(self.drain().len())
    }
}

/// Read a recovery file back. Blank lines are ignored; lines that do not
/// parse as a record are logged and skipped.
pub async fn read_recovery_file(path: &Path) -> Result<Vec<UnifiedRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading recovery file {}", path.display()))?;
    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<UnifiedRecord>(line) {
            Ok(r) => out.push(r),
            Err(e) => tracing::warn!(line = i + 1, error = %e, "skipping unreadable recovery line"),
        }
    }
    Ok(out)
}
