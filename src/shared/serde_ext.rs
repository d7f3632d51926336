use serde_json::Value;

pub const PERCENT_MIN: i64 = 0;
pub const PERCENT_MAX: i64 = 100;

pub fn clamp_percent(value: i64) -> i64 {
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Reads a JSON number as an integer, rounding floats and accepting numeric strings.
///
/// Decision sources routinely emit `5.0` or `"40"` where an integer is expected.
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|v| v.min(i64::MAX as u64) as i64))
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64)),
        Value::String(raw) => {
            let trimmed = raw.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.round() as i64))
        }
        _ => None,
    }
}

pub fn lenient_percent(value: &Value) -> Option<i64> {
    lenient_i64(value).map(clamp_percent)
}

pub fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|v| v != 0),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Parses a reply that is a JSON document as a whole, or whose JSON sits in a
/// markdown code fence.
pub fn parse_json_document(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }
    fenced_body(trimmed).and_then(|body| serde_json::from_str(body).ok())
}

/// Finds the JSON document inside free-form model output.
///
/// Tries [`parse_json_document`] first, then the span between the first `{` and
/// the last `}`.
pub fn extract_json_value(text: &str) -> Option<Value> {
    if let Some(value) = parse_json_document(text) {
        return Some(value);
    }
    let trimmed = text.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn fenced_body(text: &str) -> Option<&str> {
    let (_, after_open) = text.split_once("```")?;
    let (_, body) = after_open.split_once('\n')?;
    let (body, _) = body.split_once("```")?;
    Some(body.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_integers_round_and_clamp() {
        assert_eq!(lenient_i64(&json!(40)), Some(40));
        assert_eq!(lenient_i64(&json!(4.6)), Some(5));
        assert_eq!(lenient_i64(&json!(" 12 ")), Some(12));
        assert_eq!(lenient_i64(&json!("hot")), None);
        assert_eq!(lenient_percent(&json!(250)), Some(100));
        assert_eq!(lenient_percent(&json!(-3)), Some(0));
    }

    #[test]
    fn extracts_json_from_prose_and_fences() {
        assert_eq!(extract_json_value(" {\"a\": 1} "), Some(json!({"a": 1})));
        assert_eq!(
            extract_json_value("```json\n{\"tool\": \"x\"}\n```"),
            Some(json!({"tool": "x"}))
        );
        assert_eq!(
            extract_json_value("Sure! {\"action\": \"direct_response\"} hope that helps"),
            Some(json!({"action": "direct_response"}))
        );
        assert_eq!(extract_json_value("42"), Some(json!(42)));
        assert_eq!(extract_json_value("no json here"), None);
        assert_eq!(extract_json_value("} backwards {"), None);
    }

    #[test]
    fn documents_ignore_objects_embedded_in_prose() {
        assert_eq!(
            parse_json_document("Here it is:\n```json\n{\"tool\": \"x\"}\n```\nDone."),
            Some(json!({"tool": "x"}))
        );
        assert_eq!(
            parse_json_document("Send {\"heatingLevel\": 2} to the thermal tool."),
            None
        );
        assert_eq!(parse_json_document("   "), None);
    }

    #[test]
    fn lenient_bools_accept_common_spellings() {
        assert_eq!(lenient_bool(&json!(true)), Some(true));
        assert_eq!(lenient_bool(&json!("off")), Some(false));
        assert_eq!(lenient_bool(&json!(1)), Some(true));
        assert_eq!(lenient_bool(&json!([])), None);
    }
}
