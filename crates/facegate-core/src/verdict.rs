//! Defensive parsing and classification of the service's verdict.

use crate::types::{Classification, ClassifyMode, Verdict, VerdictStatus};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_STATUS: &str = "BLOCK: UNKNOWN";

const MATCH_MARKER: &str = "Match Found";
const SPOOF_MARKER: &str = "SPOOF";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerdictError {
    #[error("response is not a JSON object: {0}")]
    Malformed(String),
    #[error("field `{field}` has unexpected type: {found}")]
    InvalidField { field: &'static str, found: String },
}

/// Parse the raw response text into a [`Verdict`].
///
/// Missing (or null) fields fall back to `BLOCK: UNKNOWN`, `0`, and `""`.
/// Confidence is not clamped, but a value that does not fit an `i64` after
/// rounding is an [`VerdictError::InvalidField`].
pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| VerdictError::Malformed(e.to_string()))?;
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(VerdictError::Malformed(format!(
                "expected object, got {}",
                type_name(&other)
            )))
        }
    };

    let status = string_field(&obj, "status")?.unwrap_or_else(|| DEFAULT_STATUS.to_string());
    let confidence_score = confidence_field(&obj)?.unwrap_or(0);
    let reasoning = string_field(&obj, "reasoning")?.unwrap_or_default();

    Ok(Verdict {
        status,
        confidence_score,
        reasoning,
    })
}

fn string_field(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, VerdictError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(VerdictError::InvalidField {
            field,
            found: type_name(other).to_string(),
        }),
    }
}

fn confidence_field(obj: &Map<String, Value>) -> Result<Option<i64>, VerdictError> {
    const FIELD: &str = "confidence_score";
    match obj.get(FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            // Non-integral scores are rounded; anything outside i64 is rejected.
            match n.as_f64().filter(|_| n.is_f64()).map(f64::round) {
                Some(r) if r >= i64::MIN as f64 && r < i64::MAX as f64 => Ok(Some(r as i64)),
                _ => Err(VerdictError::InvalidField {
                    field: FIELD,
                    found: n.to_string(),
                }),
            }
        }
        Some(other) => Err(VerdictError::InvalidField {
            field: FIELD,
            found: type_name(other).to_string(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Exact parse of a status string into one of the known variants.
pub fn parse_status(status: &str) -> VerdictStatus {
    let trimmed = status.trim();
    if let Some(name) = trimmed.strip_prefix("Match Found:") {
        let name = name.trim();
        if !name.is_empty() {
            return VerdictStatus::Match(name.to_string());
        }
    }
    match trimmed {
        "BLOCK: SPOOF" => VerdictStatus::Spoof,
        "BLOCK: UNKNOWN" => VerdictStatus::Unknown,
        "BLOCK: NON_HUMAN" => VerdictStatus::NonHuman,
        _ => VerdictStatus::Unrecognized(status.to_string()),
    }
}

/// Pick the presentation branch for a status string.
pub fn classify(status: &str, mode: ClassifyMode) -> Classification {
    match mode {
        ClassifyMode::Substring => {
            if status.contains(MATCH_MARKER) {
                Classification::Match
            } else if status.contains(SPOOF_MARKER) {
                Classification::SpoofAlert
            } else {
                Classification::Warning
            }
        }
        ClassifyMode::Exact => match parse_status(status) {
            VerdictStatus::Match(_) => Classification::Match,
            VerdictStatus::Spoof => Classification::SpoofAlert,
            VerdictStatus::Unknown | VerdictStatus::NonHuman | VerdictStatus::Unrecognized(_) => {
                Classification::Warning
            }
        },
    }
}
