use seatpilot::app::cli::cli_help_lines;
use seatpilot::app::command_handlers::run_cli;
use serde_json::Value;

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn app_cli_module_unknown_command_is_an_error() {
    let err = run_cli(args(&["serve"])).expect_err("unknown command");
    assert_eq!(err, "unknown command `serve`");
}

#[test]
fn app_cli_module_no_arguments_prints_help() {
    let help = run_cli(Vec::new()).expect("help");
    for line in cli_help_lines() {
        assert!(help.contains(&line), "{line}");
    }
    assert!(help.contains("--config <path>"));
}

#[test]
fn app_cli_module_normalize_prints_the_full_command() {
    let output = run_cli(args(&[
        "normalize",
        r#"{"motors": {"Track": {"percentage": 40, "direction": "forward"}}}"#,
    ]))
    .expect("normalize");
    let parsed: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(parsed["seatCommand"]["motors"]["Track"]["percentage"], 40);
    assert_eq!(parsed["seatCommand"]["motors"]["Backrest"]["percentage"], 0);
    assert_eq!(parsed["active"], serde_json::json!(["motors"]));
    assert_eq!(parsed["fallbacks"], serde_json::json!([]));
}

#[test]
fn app_cli_module_normalize_reports_skipped_sections() {
    let output = run_cli(args(&["normalize", r#"{"thermal": "hot"}"#])).expect("normalize");
    let parsed: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(parsed["seatCommand"]["thermal"]["heatingLevel"], 0);
    let fallbacks = parsed["fallbacks"].as_array().expect("fallbacks");
    assert_eq!(fallbacks.len(), 1);
    assert!(fallbacks[0].as_str().is_some_and(|text| text.contains("thermal")));
}

#[test]
fn app_cli_module_fixed_effects_need_no_settings() {
    let output = run_cli(args(&["tools", "--fixed-effects"])).expect("fixed effects");
    let parsed: Value = serde_json::from_str(&output).expect("json output");
    let names: Vec<&str> = parsed["fixed_effects"]
        .as_array()
        .expect("fixed effects")
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    assert!(names.contains(&"move_track_forward"));
}

#[test]
fn app_cli_module_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.yaml");
    let err = run_cli(vec![
        "--config".to_string(),
        missing.display().to_string(),
        "metadata".to_string(),
    ])
    .expect_err("missing config");
    assert!(err.contains("absent.yaml"), "{err}");
}

#[test]
fn app_cli_module_query_requires_text() {
    let err = run_cli(args(&["query"])).expect_err("usage");
    assert!(err.starts_with("usage:"));
}
