#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Query,
    Tools,
    Metadata,
    Refresh,
    Normalize,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "query" | "ask" => CliVerb::Query,
        "tools" => CliVerb::Tools,
        "metadata" => CliVerb::Metadata,
        "refresh" => CliVerb::Refresh,
        "normalize" => CliVerb::Normalize,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  query <text>                         Answer a driver query and print the response JSON"
            .to_string(),
        "  tools                                List discovered capabilities per backend"
            .to_string(),
        "  tools --fixed-effects                List the built-in fixed seat effects".to_string(),
        "  metadata                             Show the current telemetry snapshot".to_string(),
        "  refresh                              Rediscover capabilities and reload telemetry"
            .to_string(),
        "  normalize <json>                     Normalize a seat command fragment".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub fn option_help_lines() -> Vec<String> {
    vec![
        "Options:".to_string(),
        "  --config <path>                      Settings file (default: $SEATPILOT_CONFIG or ~/.seatpilot/config.yaml)"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.extend(option_help_lines());
    lines.join("\n")
}
