use crate::assistant::Assistant;
use crate::config::{load_global_settings, load_settings, ConfigError, Settings};
use serde_json::Value;
use std::path::PathBuf;

pub const CONFIG_FLAG: &str = "--config";

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Arguments left after pulling out `--config <path>` (or `--config=<path>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArgs {
    pub config: Option<PathBuf>,
    pub rest: Vec<String>,
}

pub fn split_config_flag(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == CONFIG_FLAG {
            let path = iter
                .next()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| format!("{CONFIG_FLAG} requires a path"))?;
            parsed.config = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--config=") {
            if path.trim().is_empty() {
                return Err(format!("{CONFIG_FLAG} requires a path"));
            }
            parsed.config = Some(PathBuf::from(path));
        } else {
            parsed.rest.push(arg.clone());
        }
    }
    Ok(parsed)
}

pub fn load_cli_settings(config: Option<&PathBuf>) -> Result<Settings, String> {
    match config {
        Some(path) => load_settings(path).map_err(map_config_err),
        None => load_global_settings().map_err(map_config_err),
    }
}

pub fn build_assistant(config: Option<&PathBuf>) -> Result<Assistant, String> {
    let settings = load_cli_settings(config)?;
    Assistant::from_settings(&settings).map_err(map_config_err)
}

pub fn render_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode output: {e}"))
}
