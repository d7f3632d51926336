use crate::app::command_support::{build_assistant, render_json};
use crate::command::fixed_effect_descriptors;
use serde_json::{json, Value};
use std::path::PathBuf;

pub const FIXED_EFFECTS_FLAG: &str = "--fixed-effects";

pub fn cmd_tools(config: Option<&PathBuf>, args: &[String]) -> Result<String, String> {
    match args {
        [] => render_json(&build_assistant(config)?.tools()),
        [flag] if flag == FIXED_EFFECTS_FLAG => render_json(&fixed_effects_listing()),
        _ => Err(format!("usage: seatpilot tools [{FIXED_EFFECTS_FLAG}]")),
    }
}

pub fn cmd_metadata(config: Option<&PathBuf>) -> Result<String, String> {
    render_json(&build_assistant(config)?.metadata())
}

pub fn cmd_refresh(config: Option<&PathBuf>) -> Result<String, String> {
    render_json(&build_assistant(config)?.refresh())
}

pub fn fixed_effects_listing() -> Value {
    let tools: Vec<Value> = fixed_effect_descriptors()
        .iter()
        .map(|descriptor| descriptor.to_wire())
        .collect();
    json!({ "fixed_effects": tools })
}
