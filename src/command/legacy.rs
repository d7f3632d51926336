use serde_json::{json, Map, Value};

pub const LEGACY_VENTILATION_LEVEL: i64 = 3;
pub const LEGACY_VIBE_ACTION: i64 = 1;
pub const LEGACY_VIBE_MAIN_VOLUME: i64 = 5;

/// Rewrites the older boolean switches into their structured sections.
///
/// - `ventilation: bool` becomes `thermal.ventilationLevel` 3 or 0
/// - `vibe: true` becomes `vibe {action: 1, mainVolume: 5}`, `vibe: false` is dropped
/// - `massage: bool` becomes `pneumatic.massage.is_active`
///
/// A structured field that is already present is never overwritten.
pub fn migrate(mut fragment: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Bool(enabled)) = fragment.get("ventilation").cloned() {
        fragment.remove("ventilation");
        let level = if enabled { LEGACY_VENTILATION_LEVEL } else { 0 };
        fill_missing(&mut fragment, &["thermal"], "ventilationLevel", json!(level));
    }

    if let Some(Value::Bool(enabled)) = fragment.get("vibe").cloned() {
        fragment.remove("vibe");
        if enabled {
            fragment.insert(
                "vibe".to_string(),
                json!({
                    "action": LEGACY_VIBE_ACTION,
                    "mainVolume": LEGACY_VIBE_MAIN_VOLUME,
                }),
            );
        }
    }

    if let Some(Value::Bool(active)) = fragment.get("massage").cloned() {
        fragment.remove("massage");
        fill_missing(
            &mut fragment,
            &["pneumatic", "massage"],
            "is_active",
            Value::Bool(active),
        );
    }

    fragment
}

/// Sets `path.key` unless it already exists. Gives up when something on the path
/// is not an object; the normalizer reports that section as malformed.
fn fill_missing(root: &mut Map<String, Value>, path: &[&str], key: &str, value: Value) {
    let mut node = root;
    for segment in path {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(map) => node = map,
            _ => return,
        }
    }
    node.entry(key.to_string()).or_insert(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn boolean_switches_become_sections() {
        let migrated = migrate(object(json!({
            "ventilation": true,
            "vibe": true,
            "massage": true
        })));
        assert_eq!(
            Value::Object(migrated),
            json!({
                "thermal": {"ventilationLevel": 3},
                "vibe": {"action": 1, "mainVolume": 5},
                "pneumatic": {"massage": {"is_active": true}}
            })
        );
    }

    #[test]
    fn false_vibe_is_dropped_and_false_ventilation_is_zero() {
        let migrated = migrate(object(json!({"vibe": false, "ventilation": false})));
        assert!(!migrated.contains_key("vibe"));
        assert_eq!(migrated["thermal"]["ventilationLevel"], 0);
    }

    #[test]
    fn structured_value_wins_over_legacy_switch() {
        let migrated = migrate(object(json!({
            "ventilation": true,
            "thermal": {"ventilationLevel": 1, "heatingLevel": 2},
            "massage": false,
            "pneumatic": {"massage": {"is_active": true, "experience": "relax"}}
        })));
        assert_eq!(migrated["thermal"]["ventilationLevel"], 1);
        assert_eq!(migrated["pneumatic"]["massage"]["is_active"], true);
        assert!(!migrated.contains_key("ventilation"));
    }

    #[test]
    fn non_boolean_values_are_left_alone() {
        let migrated = migrate(object(json!({"vibe": {"action": 2}})));
        assert_eq!(migrated["vibe"]["action"], 2);
    }
}
