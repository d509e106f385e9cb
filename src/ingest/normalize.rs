// src/ingest/normalize.rs
//! Raw → unified transform. Every record is judged on its own; a bad record
//! is dropped and logged, the rest of the batch carries on.

use metrics::counter;
use serde_json::Value;
use thiserror::Error;

use super::types::{RawRecord, UnifiedRecord, SOURCE_PROVIDER_KEY};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("field {field} has unsupported type {kind}")]
    WrongType { field: &'static str, kind: &'static str },
    #[error("invalid temperature value: {0}")]
    InvalidTemperature(String),
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Required text field: strings are trimmed, numbers rendered; blank counts as missing.
fn text_field(rec: &RawRecord, field: &'static str) -> Result<String, ValidationError> {
    let s = match rec.get(field) {
        None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(ValidationError::WrongType {
                field,
                kind: kind_of(other),
            })
        }
    };
    if s.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(s)
}

fn temperature_field(rec: &RawRecord) -> Result<f64, ValidationError> {
    let parsed = match rec.get("temperature") {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("temperature")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(ValidationError::WrongType {
                field: "temperature",
                kind: kind_of(other),
            })
        }
    };
    match parsed {
        Some(t) if t.is_finite() => Ok(t),
        _ => Err(ValidationError::InvalidTemperature(
            rec.get("temperature").map(Value::to_string).unwrap_or_default(),
        )),
    }
}

/// Transform one raw record or say why it cannot be.
pub fn normalize_record(rec: &RawRecord) -> Result<UnifiedRecord, ValidationError> {
    let city = text_field(rec, "city")?;
    let temperature = temperature_field(rec)?;
    let description = text_field(rec, "description")?;
    let provider = text_field(rec, SOURCE_PROVIDER_KEY)?;
    Ok(UnifiedRecord::new(&city, temperature, &description, &provider))
}

/// Batch transform; returns the valid subset in input order.
pub fn normalize(raw: Vec<RawRecord>) -> Vec<UnifiedRecord> {
    let total = raw.len();
    let mut out = Vec::with_capacity(total);
    for (idx, rec) in raw.iter().enumerate() {
        match normalize_record(rec) {
            Ok(u) => out.push(u),
            Err(e) => {
                tracing::warn!(
                    index = idx,
                    provider = rec.source_provider().unwrap_or("unknown"),
                    reason = %e,
                    "skipping invalid record"
                );
                counter!("weather_records_dropped_total").increment(1);
            }
        }
    }
    tracing::debug!(input = total, kept = out.len(), "normalized batch");
    out
}

/// Second-line check over already-unified records: every text field
/// non-empty and trimmed, temperature finite.
pub fn validate(records: &[UnifiedRecord]) -> bool {
    for (i, r) in records.iter().enumerate() {
        let fields = [
            ("city", r.city()),
            ("description", r.description()),
            ("source_provider", r.source_provider()),
        ];
        for (name, v) in fields {
            if v.is_empty() || v.trim() != v {
                tracing::warn!(record = i + 1, field = name, "record failed validation");
                return false;
            }
        }
        if !r.temperature_celsius().is_finite() {
            tracing::warn!(record = i + 1, field = "temperature_celsius", "record failed validation");
            return false;
        }
    }
    true
}
