use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single activity record from the legacy stream.
///
/// Events are produced by the legacy source and are read-only from then on:
/// the copy never rewrites an identifier, a timestamp or a payload field.
/// The payload is opaque to the engine and travels as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: String,
    date: DateTime<Utc>,
    #[serde(default)]
    payload: BTreeMap<String, Value>,
}

impl Event {
    pub fn new(id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Event {
            id: id.into(),
            date,
            payload: BTreeMap::new(),
        }
    }

    /// Attach an opaque payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn payload(&self) -> &BTreeMap<String, Value> {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_round_trips_through_json() {
        let event = Event::new("ev-1", Utc::now())
            .with_field("application", json!("wiki"))
            .with_field("document", json!({"space": "Main", "page": "Home"}));

        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&encoded).unwrap();

        assert_eq!(event, decoded);
        assert_eq!(decoded.payload()["application"], json!("wiki"));
    }

    #[test]
    fn payload_defaults_to_empty() {
        let decoded: Event =
            serde_json::from_str(r#"{"id":"ev-2","date":"2020-06-01T00:00:00Z"}"#).unwrap();
        assert!(decoded.payload().is_empty());
    }
}
