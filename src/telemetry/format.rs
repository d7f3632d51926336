use serde_json::Value;

pub const NO_METADATA: &str = "No current driver metadata available.";
pub const METADATA_UNAVAILABLE: &str = "Metadata unavailable";
const DEFAULT_TRAFFIC: &str = "Unknown";

const MOTOR_LINES: &[(&str, &str)] = &[
    ("Track", "Track"),
    ("Height", "Height"),
    ("Backrest", "Backrest"),
    ("Seat Tilt", "SeatTilt"),
    ("Uba", "Uba"),
    ("Headrest", "Headrest"),
];

/// Renders telemetry as the bullet list embedded in the system prompt. Never fails:
/// an empty document and a document missing required fields have fixed texts.
pub fn format_for_prompt(raw: &Value) -> String {
    let empty = match raw {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return NO_METADATA.to_string();
    }
    render(raw).unwrap_or_else(|| METADATA_UNAVAILABLE.to_string())
}

fn render(raw: &Value) -> Option<String> {
    let temperature = raw.get("cabin_tempreature")?;
    let motors = raw.get("motors")?;
    let traffic = raw
        .get("Traffic")
        .and_then(display)
        .unwrap_or_else(|| DEFAULT_TRAFFIC.to_string());

    let mut lines = vec![
        format!("- Driving Mode: {}", field(raw, "DrivingMode")?),
        format!("- Posture: {}", field(raw, "posture")?),
        format!(
            "- Temperature: {} {}",
            field(temperature, "value")?,
            field(temperature, "unit")?
        ),
        format!("- Car Speed: {}", field(raw, "car_speed")?),
        format!("- ventilation: {}", field(raw, "ventilation")?),
        format!("- Traffic: {traffic}"),
        format!("- Fatigue Level: {}", field(raw, "fatigue_level")?),
        "Current motors Positions:".to_string(),
    ];
    for (label, key) in MOTOR_LINES {
        lines.push(format!("  - {label}: {}", field(motors, key)?));
    }
    Some(lines.join("\n"))
}

fn field(parent: &Value, key: &str) -> Option<String> {
    parent.get(key).and_then(display)
}

fn display(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "DrivingMode": "Highway",
            "posture": "upright",
            "cabin_tempreature": {"value": 22.5, "unit": "C"},
            "car_speed": 110,
            "ventilation": false,
            "fatigue_level": "low",
            "motors": {"Track": 50, "Height": 40, "Backrest": 30, "SeatTilt": 20, "Uba": 10, "Headrest": 60}
        })
    }

    #[test]
    fn renders_every_field_with_traffic_default() {
        let text = format_for_prompt(&complete());
        assert!(text.starts_with("- Driving Mode: Highway\n- Posture: upright\n"));
        assert!(text.contains("- Temperature: 22.5 C\n"));
        assert!(text.contains("- Traffic: Unknown\n"));
        assert!(text.contains("  - Seat Tilt: 20\n"));
        assert!(text.ends_with("  - Headrest: 60"));
    }

    #[test]
    fn missing_required_field_degrades() {
        let mut raw = complete();
        raw["motors"].as_object_mut().expect("motors").remove("Uba");
        assert_eq!(format_for_prompt(&raw), METADATA_UNAVAILABLE);
    }

    #[test]
    fn empty_documents_have_fixed_text() {
        assert_eq!(format_for_prompt(&Value::Null), NO_METADATA);
        assert_eq!(format_for_prompt(&json!({})), NO_METADATA);
    }
}
