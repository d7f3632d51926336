use super::format::format_for_prompt;
use crate::shared::serde_ext::lenient_i64;
use chrono::{DateTime, Utc};
use serde_json::Value;

const TEMPERATURE_KEY: &str = "cabin_tempreature";
const TEMPERATURE_ALIASES: &[&str] = &["cabin_temperature"];

/// Telemetry as last read from the source, plus when it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStateSnapshot {
    raw: Value,
    captured_at: Option<DateTime<Utc>>,
}

impl LiveStateSnapshot {
    pub fn new(raw: Value, captured_at: DateTime<Utc>) -> Self {
        Self {
            raw: canonicalize_keys(raw),
            captured_at: Some(captured_at),
        }
    }

    /// Placeholder served before the first successful load.
    pub fn empty() -> Self {
        Self {
            raw: Value::Null,
            captured_at: None,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    pub fn is_empty(&self) -> bool {
        match &self.raw {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Current position of a motor as published under `motors.<name>`.
    pub fn motor_position(&self, motor: &str) -> Option<i64> {
        self.raw.get("motors")?.get(motor).and_then(lenient_i64)
    }

    pub fn formatted(&self) -> String {
        format_for_prompt(&self.raw)
    }
}

fn canonicalize_keys(mut raw: Value) -> Value {
    if let Value::Object(map) = &mut raw {
        if !map.contains_key(TEMPERATURE_KEY) {
            let alias = TEMPERATURE_ALIASES
                .iter()
                .find_map(|alias| map.get(*alias).cloned());
            if let Some(value) = alias {
                map.insert(TEMPERATURE_KEY.to_string(), value);
            }
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn motor_positions_are_read_leniently() {
        let snapshot = LiveStateSnapshot::new(
            json!({"motors": {"Track": 70, "Height": "45", "Backrest": 12.6}}),
            Utc::now(),
        );
        assert_eq!(snapshot.motor_position("Track"), Some(70));
        assert_eq!(snapshot.motor_position("Height"), Some(45));
        assert_eq!(snapshot.motor_position("Backrest"), Some(13));
        assert_eq!(snapshot.motor_position("Uba"), None);
    }

    #[test]
    fn temperature_alias_is_accepted() {
        let snapshot = LiveStateSnapshot::new(
            json!({"cabin_temperature": {"value": 21, "unit": "C"}}),
            Utc::now(),
        );
        assert_eq!(snapshot.raw()["cabin_tempreature"]["value"], 21);
    }

    #[test]
    fn empty_snapshot_has_no_capture_time() {
        let snapshot = LiveStateSnapshot::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.captured_at().is_none());
    }
}
