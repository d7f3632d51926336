use crate::telemetry::LiveStateSnapshot;
use serde_json::Value;

pub mod canonical;
pub mod effects;
pub mod legacy;
pub mod motion;
pub mod normalize;

pub use canonical::{
    CanonicalCommand, MassageExperience, MassageIntensity, MotionType, MotorCommand,
    MotorDirection, MotorName, PneumaticDirection, Section, SEAT_ADJUSTMENT_CAPABILITY,
    SEAT_COMMAND_KEY,
};
pub use effects::{fixed_effect, fixed_effect_descriptors, FixedEffectDef, FIXED_EFFECTS};
pub use motion::{plan_motor_move, MotorMove, MoveAmount, DEFAULT_STEP};
pub use normalize::{
    fragment_from_reply, normalize, normalize_reply, normalize_report, NormalizationFallback,
    NormalizationReport,
};

/// Canonical command carried by a completed invocation, if any.
///
/// A `seatCommand` echoed in the tool result wins, then a full command in the
/// arguments, then the fixed-effect table. Capabilities outside all three (a
/// knowledge lookup, say) carry no command.
pub fn report_for_invocation(
    capability: &str,
    args: &Value,
    tool_result: &Value,
    snapshot: &LiveStateSnapshot,
) -> Option<NormalizationReport> {
    if tool_result
        .get(SEAT_COMMAND_KEY)
        .is_some_and(Value::is_object)
    {
        return Some(normalize_report(tool_result));
    }
    if capability == SEAT_ADJUSTMENT_CAPABILITY || args.get(SEAT_COMMAND_KEY).is_some() {
        return Some(normalize_report(args));
    }
    let fragment = fixed_effect(capability)?.fragment(args, tool_result, snapshot)?;
    Some(normalize_report(&fragment))
}

pub fn command_for_invocation(
    capability: &str,
    args: &Value,
    tool_result: &Value,
    snapshot: &LiveStateSnapshot,
) -> Option<CanonicalCommand> {
    report_for_invocation(capability, args, tool_result, snapshot).map(|report| report.command)
}
