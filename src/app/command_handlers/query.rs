use crate::app::command_support::{build_assistant, render_json};
use std::path::PathBuf;

/// Prints the response JSON; an error response is returned as `Err` so the
/// process exits non-zero with the same body on stderr.
pub fn cmd_query(config: Option<&PathBuf>, args: &[String]) -> Result<String, String> {
    let text = args.join(" ");
    if text.trim().is_empty() {
        return Err("usage: seatpilot query <text>".to_string());
    }
    let assistant = build_assistant(config)?;
    let response = assistant.process_query(&text);
    let rendered = render_json(&response.to_json())?;
    if response.is_success() {
        Ok(rendered)
    } else {
        Err(rendered)
    }
}
