//! PayloadEnvelope - キューに積まれた JSON オブジェクト
//!
//! Two keys are reserved:
//! - `attempts`: number of failed attempts so far (absent = 0)
//! - `id`: diagnostic identifier, only used in log lines
//!
//! Everything else is opaque and passes through unchanged.

use serde_json::{Map, Value};

pub const ATTEMPTS_KEY: &str = "attempts";
pub const ID_KEY: &str = "id";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadEnvelope {
    fields: Map<String, Value>,
}

impl PayloadEnvelope {
    /// Decode a raw payload.
    ///
    /// Malformed JSON (or a JSON value that is not an object) is logged and
    /// yields an empty envelope; it never fails the dispatch cycle.
    pub fn decode(raw: &str) -> Self {
        Self::try_decode(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to decode payload, using empty envelope");
            Self::default()
        })
    }

    pub fn try_decode(raw: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn attempts(&self) -> u64 {
        match self.fields.get(ATTEMPTS_KEY) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Increment `attempts` by one and return the new value.
    ///
    /// Saturates at `u64::MAX`; a saturated count never fits a retry budget.
    pub fn bump_attempts(&mut self) -> u64 {
        let next = self.attempts().saturating_add(1);
        self.fields.insert(ATTEMPTS_KEY.to_string(), Value::from(next));
        next
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn encode(&self) -> String {
        // A Map<String, Value> always serializes.
        Value::Object(self.fields.clone()).to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
