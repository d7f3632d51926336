use seatpilot::command::{
    normalize, normalize_reply, normalize_report, plan_motor_move, CanonicalCommand,
    MotorDirection, MotorMove, MoveAmount, Section,
};
use serde_json::{json, Value};

fn odd_fragments() -> Vec<Value> {
    vec![
        Value::Null,
        json!(17),
        json!("seat please"),
        json!([1, 2, 3]),
        json!({}),
        json!({"seatCommand": "warm"}),
        json!({"thermal": "hot", "motors": [1]}),
        json!({"pneumatic": 5}),
        json!({"motors": {"Track": {"percentage": "lots"}}}),
        json!({"vibe": {"action": 1, "mainVolume": 900}}),
        json!({"seatbelt": {"percentage": -40}}),
        json!({"unknown_section": {"x": 1}}),
    ]
}

#[test]
fn command_module_normalize_is_total_and_complete() {
    for fragment in odd_fragments() {
        let command = normalize(&fragment);
        let wire = command.to_wire();
        let body = wire["seatCommand"].as_object().expect("seatCommand object");
        for key in ["vibe", "pneumatic", "thermal", "motors", "seatbelt"] {
            assert!(body.contains_key(key), "{fragment} missing {key}");
        }
    }
}

#[test]
fn command_module_inactive_sections_stay_neutral() {
    let fragment = json!({
        "vibe": {"action": 0, "mainVolume": 80},
        "pneumatic": {
            "adjustement": {"lumbar": {"direction": "increase", "percentage": 0}},
            "massage": {"is_active": false, "experience": "relax", "intensity": "high"}
        },
        "thermal": {"heatingLevel": 0, "ventilationLevel": 0},
        "motors": {"Track": {"percentage": 0, "direction": "forward"}},
        "seatbelt": {"percentage": 0}
    });
    let report = normalize_report(&fragment);
    assert!(report.command.is_neutral());
    assert!(report.active.is_empty());
    assert!(report.fallbacks.is_empty());
}

#[test]
fn command_module_normalize_is_idempotent() {
    let fragments = vec![
        json!({"thermal": {"heatingLevel": 2}}),
        json!({"motors": {"Track": {"percentage": 40, "direction": "forward"}}, "seatbelt": {"percentage": 30}}),
        json!({"ventilation": true, "massage": true, "vibe": true}),
        json!({"pneumatic": {"adjustement": {"neckrest": {"direction": "decrease", "percentage": 15}}}}),
    ];
    for fragment in fragments {
        let once = normalize(&fragment);
        let twice = normalize(&once.to_wire());
        assert_eq!(once, twice, "{fragment}");
    }
}

#[test]
fn command_module_track_only_fragment_leaves_other_motors_neutral() {
    let report = normalize_report(&json!({
        "seatCommand": {"motors": {"Track": {"percentage": 40, "direction": "forward"}}}
    }));
    let mut expected = CanonicalCommand::neutral();
    expected.motors.track.percentage = 40;
    expected.motors.track.direction = MotorDirection::Forward;
    assert_eq!(report.command, expected);
    assert_eq!(report.active.iter().copied().collect::<Vec<_>>(), vec![Section::Motors]);
}

#[test]
fn command_module_legacy_flags_become_structured_sections() {
    let command = normalize(&json!({"ventilation": true, "massage": true}));
    assert!(command.thermal.ventilation_level > 0);
    assert_eq!(command.thermal.heating_level, 0);
    assert!(command.pneumatic.massage.is_active);
}

#[test]
fn command_module_reply_text_with_embedded_command() {
    let reply = r#"{"answer": "Done. {\"seatCommand\": {\"seatbelt\": {\"percentage\": 150}}}"}"#;
    assert_eq!(normalize_reply(reply).seatbelt.percentage, 100);
    assert!(normalize_reply("no structure here").is_neutral());
}

#[test]
fn command_module_move_fully_reaches_the_end_stops() {
    assert_eq!(
        plan_motor_move(70, MotorDirection::Forward, MoveAmount::Fully).delta,
        30
    );
    assert_eq!(
        plan_motor_move(70, MotorDirection::Backward, MoveAmount::Fully),
        MotorMove {
            previous: 70,
            new: 0,
            delta: -70
        }
    );
    assert_eq!(
        plan_motor_move(95, MotorDirection::Forward, MoveAmount::default()).new,
        100
    );
}
