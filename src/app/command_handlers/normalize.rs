use crate::app::command_support::render_json;
use crate::command::{fragment_from_reply, normalize_report, NormalizationReport};
use serde_json::{json, Value};

/// Normalizes whatever fragment is embedded in the arguments. Input without any
/// JSON object still yields the neutral command.
pub fn cmd_normalize(args: &[String]) -> Result<String, String> {
    let text = args.join(" ");
    if text.trim().is_empty() {
        return Err("usage: seatpilot normalize <json>".to_string());
    }
    let report = fragment_from_reply(&text)
        .map(|fragment| normalize_report(&fragment))
        .unwrap_or_default();
    render_json(&report_json(&report))
}

pub fn report_json(report: &NormalizationReport) -> Value {
    let mut wire = report.command.to_wire();
    if let Value::Object(map) = &mut wire {
        map.insert(
            "active".to_string(),
            json!(report.active.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
        );
        map.insert(
            "fallbacks".to_string(),
            json!(report
                .fallbacks
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()),
        );
    }
    wire
}
