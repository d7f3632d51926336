use super::canonical::{MotionType, MotorCommand, MotorDirection, MotorName};
use super::motion::{plan_motor_move, MotorMove, MoveAmount, DEFAULT_STEP};
use crate::catalog::{ParameterSpec, ToolDescriptor};
use crate::shared::serde_ext::{clamp_percent, lenient_bool, lenient_i64, PERCENT_MAX};
use crate::telemetry::LiveStateSnapshot;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Move {
        motor: MotorName,
        /// Key under `motors` in the telemetry document.
        telemetry_key: &'static str,
        direction: MotorDirection,
    },
    Heating,
    Ventilation,
    Experience,
}

/// A capability whose effect on the seat is known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEffectDef {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: EffectKind,
}

macro_rules! motor_move {
    ($name:literal, $description:literal, $motor:ident, $key:literal, $direction:ident $(,)?) => {
        FixedEffectDef {
            name: $name,
            description: $description,
            kind: EffectKind::Move {
                motor: MotorName::$motor,
                telemetry_key: $key,
                direction: MotorDirection::$direction,
            },
        }
    };
}

pub static FIXED_EFFECTS: &[FixedEffectDef] = &[
    FixedEffectDef {
        name: "adjust_thermal",
        description: "Adjust the thermal/heating level in the vehicle",
        kind: EffectKind::Heating,
    },
    FixedEffectDef {
        name: "adjust_ventilation",
        description: "Adjust the ventilation level in the vehicle",
        kind: EffectKind::Ventilation,
    },
    FixedEffectDef {
        name: "adjust_highway_experience",
        description: "Activate highway driving experience with optimized seat position",
        kind: EffectKind::Experience,
    },
    FixedEffectDef {
        name: "adjust_city_experience",
        description: "Activate city driving experience with optimized seat position",
        kind: EffectKind::Experience,
    },
    motor_move!(
        "move_track_forward",
        "Move the seat track forward (away from steering wheel)",
        Track,
        "Track",
        Forward,
    ),
    motor_move!(
        "move_track_backward",
        "Move the seat track backward (toward steering wheel)",
        Track,
        "Track",
        Backward,
    ),
    motor_move!(
        "move_height_up",
        "Move the seat height up",
        Height,
        "Height",
        Forward,
    ),
    motor_move!(
        "move_height_down",
        "Move the seat height down",
        Height,
        "Height",
        Backward,
    ),
    motor_move!(
        "move_backrest_forward",
        "Move the backrest forward (more upright position)",
        Backrest,
        "Backrest",
        Forward,
    ),
    motor_move!(
        "move_backrest_backward",
        "Move the backrest backward (more reclined position)",
        Backrest,
        "Backrest",
        Backward,
    ),
    motor_move!(
        "move_seattilt_up",
        "Tilt the seat up (front edge higher)",
        Tilt,
        "SeatTilt",
        Forward,
    ),
    motor_move!(
        "move_seattilt_down",
        "Tilt the seat down (front edge lower)",
        Tilt,
        "SeatTilt",
        Backward,
    ),
    motor_move!(
        "move_uba_forward",
        "Move the UBA (Upper Back Adjustment) forward",
        Uba,
        "Uba",
        Forward,
    ),
    motor_move!(
        "move_uba_backward",
        "Move the UBA (Upper Back Adjustment) backward",
        Uba,
        "Uba",
        Backward,
    ),
    motor_move!(
        "move_headrest_forward",
        "Move the headrest forward (closer to head)",
        Headrest,
        "Headrest",
        Forward,
    ),
    motor_move!(
        "move_headrest_backward",
        "Move the headrest backward (away from head)",
        Headrest,
        "Headrest",
        Backward,
    ),
];

const EXPERIENCE_MOTORS: &[(&str, MotorName)] = &[
    ("backrest", MotorName::Backrest),
    ("track", MotorName::Track),
    ("tilt", MotorName::Tilt),
];

pub fn fixed_effect(name: &str) -> Option<&'static FixedEffectDef> {
    FIXED_EFFECTS.iter().find(|effect| effect.name == name)
}

pub fn fixed_effect_descriptors() -> Vec<ToolDescriptor> {
    FIXED_EFFECTS.iter().map(FixedEffectDef::descriptor).collect()
}

impl FixedEffectDef {
    pub fn descriptor(&self) -> ToolDescriptor {
        let tool = ToolDescriptor::new(self.name, self.description);
        match self.kind {
            EffectKind::Move { telemetry_key, .. } => tool
                .with_parameter(
                    ParameterSpec::new(
                        "current_value",
                        "integer",
                        &format!("Current {telemetry_key} position (0-100)"),
                    )
                    .bounded(0, 100),
                    true,
                )
                .with_parameter(
                    ParameterSpec::new("step", "integer", "Movement step size")
                        .bounded(1, 100)
                        .with_default(json!(DEFAULT_STEP)),
                    false,
                )
                .with_parameter(
                    ParameterSpec::new("new_value", "integer", "Target position (0-100)")
                        .bounded(0, 100),
                    false,
                )
                .with_parameter(
                    ParameterSpec::new("fully", "boolean", "Move all the way to the end stop")
                        .with_default(json!(false)),
                    false,
                ),
            EffectKind::Heating => tool.with_parameter(
                ParameterSpec::new("heatingLevel", "integer", "Heating level from 0 to 100")
                    .bounded(0, 100),
                true,
            ),
            EffectKind::Ventilation => tool.with_parameter(
                ParameterSpec::new(
                    "ventilationLevel",
                    "integer",
                    "Ventilation level from 0 to 100",
                )
                .bounded(0, 100),
                true,
            ),
            EffectKind::Experience => EXPERIENCE_MOTORS.iter().fold(tool, |tool, (arg, motor)| {
                tool.with_parameter(
                    ParameterSpec::new(arg, "integer", &format!("{motor} position (0-100)"))
                        .bounded(0, 100),
                    true,
                )
            }),
        }
    }

    /// Command fragment for one invocation of this capability, or `None` when the
    /// arguments do not say enough to know the effect.
    ///
    /// Moves prefer the positions the backend reported in `tool_result`, then the
    /// `current_value` argument, then the live telemetry.
    pub fn fragment(
        &self,
        args: &Value,
        tool_result: &Value,
        snapshot: &LiveStateSnapshot,
    ) -> Option<Value> {
        match self.kind {
            EffectKind::Move {
                motor,
                telemetry_key,
                direction,
            } => {
                let command = move_command(args, tool_result, snapshot, telemetry_key, direction)?;
                Some(json!({ "motors": { motor.as_str(): command } }))
            }
            EffectKind::Heating => {
                let level = args.get("heatingLevel").and_then(lenient_i64)?;
                Some(json!({ "thermal": { "heatingLevel": clamp_percent(level) } }))
            }
            EffectKind::Ventilation => {
                let level = args.get("ventilationLevel").and_then(lenient_i64)?;
                Some(json!({ "thermal": { "ventilationLevel": clamp_percent(level) } }))
            }
            EffectKind::Experience => {
                let motors: Map<String, Value> = EXPERIENCE_MOTORS
                    .iter()
                    .filter_map(|(arg, motor)| {
                        let position = args.get(*arg).and_then(lenient_i64)?;
                        let command = MotorCommand {
                            percentage: clamp_percent(position),
                            motion: MotionType::Absolute,
                            direction: MotorDirection::Neutral,
                        };
                        Some((motor.as_str().to_string(), json!(command)))
                    })
                    .collect();
                if motors.is_empty() {
                    return None;
                }
                Some(json!({ "motors": motors }))
            }
        }
    }
}

fn move_command(
    args: &Value,
    tool_result: &Value,
    snapshot: &LiveStateSnapshot,
    telemetry_key: &str,
    direction: MotorDirection,
) -> Option<MotorCommand> {
    let reported = tool_result
        .get("previous_value")
        .and_then(lenient_i64)
        .zip(tool_result.get("new_value").and_then(lenient_i64));
    if let Some((previous, new)) = reported {
        return Some(MotorMove::between(previous, new).to_command());
    }

    let fully = args.get("fully").and_then(lenient_bool).unwrap_or(false);
    let amount = match args.get("new_value").and_then(lenient_i64) {
        Some(target) => MoveAmount::Target(target),
        None if fully => MoveAmount::Fully,
        None => MoveAmount::Step(
            args.get("step")
                .and_then(lenient_i64)
                .map_or(DEFAULT_STEP, |step| clamp_percent(step.saturating_abs())),
        ),
    };
    let current = args
        .get("current_value")
        .and_then(lenient_i64)
        .or_else(|| snapshot.motor_position(telemetry_key));

    match (current, amount) {
        (Some(current), amount) => Some(plan_motor_move(current, direction, amount).to_command()),
        (None, MoveAmount::Step(step)) => Some(MotorCommand {
            percentage: step,
            motion: MotionType::Relative,
            direction,
        }),
        (None, MoveAmount::Fully) => Some(MotorCommand {
            percentage: PERCENT_MAX,
            motion: MotionType::Relative,
            direction,
        }),
        (None, MoveAmount::Target(_)) => None,
    }
}
