//! Response envelope `{ data, code, msg }` and list payload normalization.
//!
//! Backends disagree on shape: list data may be a flat array, a page object
//! `{ records, total, current, size }`, or that page object wrapped once or twice
//! more under `data`; counts may arrive as numbers or strings. Everything here
//! reduces those variants to [`ListPage`].

use crate::adapter::{ListPage, Record};
use crate::error::AdminError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys that may hold the row array of a page object.
const RECORD_KEYS: [&str; 3] = ["records", "list", "items"];
/// How many `data` wrappers are unwrapped below the envelope itself.
const MAX_DATA_NESTING: usize = 2;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub code: Value,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default)]
    pub service_code: Option<Value>,
}

impl Envelope {
    /// Embedded business code; accepts numbers and numeric strings.
    pub fn code(&self) -> Option<i64> {
        match &self.code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Unwrap `data` when the business code matches this adapter's success code.
    pub fn into_data(self, success_code: i64) -> Result<Value, AdminError> {
        match self.code() {
            Some(code) if code == success_code => Ok(self.data),
            code => {
                tracing::warn!(code = ?code, expected = success_code, msg = ?self.msg, "business failure");
                Err(AdminError::Business {
                    code: code.unwrap_or(-1),
                    message: self.msg,
                })
            }
        }
    }
}

/// Count coercion without NaN: numbers (non-negative, truncated) and numeric strings.
pub fn coerce_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64))
        }
        _ => None,
    }
}

fn coerce_u32(v: Option<&Value>) -> Option<u32> {
    v.and_then(coerce_count).and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0)
}

/// Normalize list `data` into a page. Missing or malformed totals fall back to the row count.
pub fn normalize_list(data: Value) -> Result<ListPage, AdminError> {
    normalize_at(data, 0)
}

fn normalize_at(data: Value, depth: usize) -> Result<ListPage, AdminError> {
    match data {
        Value::Null => Ok(ListPage::default()),
        Value::Array(rows) => {
            let items = into_records(rows);
            let total = items.len() as u64;
            Ok(ListPage {
                items,
                total,
                current: None,
                size: None,
            })
        }
        Value::Object(mut obj) => {
            if let Some(key) = RECORD_KEYS.iter().find(|k| obj.get(**k).is_some_and(Value::is_array)) {
                let rows = match obj.remove(*key) {
                    Some(Value::Array(rows)) => rows,
                    _ => Vec::new(),
                };
                let items = into_records(rows);
                let total = obj
                    .get("total")
                    .and_then(coerce_count)
                    .unwrap_or(items.len() as u64);
                return Ok(ListPage {
                    current: coerce_u32(obj.get("current")),
                    size: coerce_u32(obj.get("size")),
                    items,
                    total,
                });
            }
            if depth < MAX_DATA_NESTING {
                if let Some(inner) = obj.remove("data") {
                    return normalize_at(inner, depth + 1);
                }
            }
            Err(AdminError::Decode(format!(
                "list payload has no record array; keys: {:?}",
                obj.keys().collect::<Vec<_>>()
            )))
        }
        other => Err(AdminError::Decode(format!("list payload must be an array or object, got {}", other))),
    }
}

fn into_records(rows: Vec<Value>) -> Vec<Record> {
    let len = rows.len();
    let records: Vec<Record> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if records.len() != len {
        tracing::warn!(dropped = len - records.len(), "non-object rows dropped from list payload");
    }
    records
}
