use super::canonical::{
    Adjustment, CanonicalCommand, Massage, MassageExperience, MassageIntensity, MotionType,
    MotorCommand, MotorDirection, MotorName, Motors, PneumaticCell, PneumaticDirection, Seatbelt,
    Section, Thermal, Vibe, SEAT_COMMAND_KEY,
};
use super::legacy;
use crate::shared::serde_ext::{extract_json_value, lenient_bool, lenient_percent};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A section of the fragment that was ignored because its fields had the wrong types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("section `{section}` skipped: {reason}")]
pub struct NormalizationFallback {
    pub section: Section,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizationReport {
    pub command: CanonicalCommand,
    pub active: BTreeSet<Section>,
    pub fallbacks: Vec<NormalizationFallback>,
}

pub fn normalize(fragment: &Value) -> CanonicalCommand {
    normalize_report(fragment).command
}

/// Normalizes a command embedded in free-form model output.
pub fn normalize_reply(text: &str) -> CanonicalCommand {
    fragment_from_reply(text)
        .map(|fragment| normalize(&fragment))
        .unwrap_or_default()
}

/// The JSON fragment inside a reply, looking through an `{"answer": "..."}` wrapper.
pub fn fragment_from_reply(text: &str) -> Option<Value> {
    let value = extract_json_value(text)?;
    if value.get(SEAT_COMMAND_KEY).is_none() {
        let wrapped = value
            .get("answer")
            .and_then(Value::as_str)
            .and_then(extract_json_value);
        if wrapped.is_some() {
            return wrapped;
        }
    }
    Some(value)
}

/// Turns any fragment into a complete command. Sections that are absent, inactive,
/// or malformed keep their neutral defaults; named fields overwrite defaults one by
/// one and every number ends up in `[0, 100]`.
pub fn normalize_report(fragment: &Value) -> NormalizationReport {
    let mut report = NormalizationReport::default();
    let body = match fragment {
        Value::Object(map) => match map.get(SEAT_COMMAND_KEY) {
            Some(Value::Object(inner)) => inner.clone(),
            Some(_) => return report,
            None => map.clone(),
        },
        _ => return report,
    };
    let body = legacy::migrate(body);

    merge_section(
        &mut report,
        Section::Vibe,
        body.get("vibe"),
        parse_vibe,
        |vibe| vibe.action > 0,
        |command, vibe| command.vibe = vibe,
    );

    match body.get("pneumatic") {
        None | Some(Value::Null) => {}
        Some(Value::Object(pneumatic)) => {
            let adjustment = pneumatic
                .get("adjustement")
                .or_else(|| pneumatic.get("adjustment"));
            merge_section(
                &mut report,
                Section::PneumaticAdjustment,
                adjustment,
                parse_adjustment,
                |adjustment| adjustment.lumbar.percentage > 0 || adjustment.neckrest.percentage > 0,
                |command, adjustment| command.pneumatic.adjustment = adjustment,
            );
            merge_section(
                &mut report,
                Section::Massage,
                pneumatic.get("massage"),
                parse_massage,
                |massage| massage.is_active,
                |command, massage| command.pneumatic.massage = massage,
            );
        }
        Some(_) => {
            for section in [Section::PneumaticAdjustment, Section::Massage] {
                report.fallbacks.push(NormalizationFallback {
                    section,
                    reason: "`pneumatic` must be an object".to_string(),
                });
            }
        }
    }

    merge_section(
        &mut report,
        Section::Thermal,
        body.get("thermal"),
        parse_thermal,
        |thermal| thermal.heating_level > 0 || thermal.ventilation_level > 0,
        |command, thermal| command.thermal = thermal,
    );
    merge_section(
        &mut report,
        Section::Motors,
        body.get("motors"),
        parse_motors,
        |motors| {
            MotorName::ALL
                .iter()
                .any(|motor| motors.get(*motor).percentage > 0)
        },
        |command, motors| command.motors = motors,
    );
    merge_section(
        &mut report,
        Section::Seatbelt,
        body.get("seatbelt"),
        parse_seatbelt,
        |seatbelt| seatbelt.percentage > 0,
        |command, seatbelt| command.seatbelt = seatbelt,
    );

    report
}

fn merge_section<T>(
    report: &mut NormalizationReport,
    section: Section,
    raw: Option<&Value>,
    parse: fn(&Value) -> Result<T, String>,
    is_active: fn(&T) -> bool,
    assign: fn(&mut CanonicalCommand, T),
) {
    let Some(raw) = raw.filter(|value| !value.is_null()) else {
        return;
    };
    match parse(raw) {
        Ok(parsed) if is_active(&parsed) => {
            assign(&mut report.command, parsed);
            report.active.insert(section);
        }
        Ok(_) => {}
        Err(reason) => report.fallbacks.push(NormalizationFallback { section, reason }),
    }
}

fn parse_vibe(raw: &Value) -> Result<Vibe, String> {
    let map = object(raw)?;
    let mut vibe = Vibe::default();
    overlay(&mut vibe.action, percent(map, "action")?);
    overlay(&mut vibe.navigation_time, text(map, "navigationTime")?);
    overlay(&mut vibe.main_volume, percent(map, "mainVolume")?);
    overlay(&mut vibe.vibe_volume, percent(map, "vibeVolume")?);
    overlay(&mut vibe.audio_volume, percent(map, "audioVolume")?);
    overlay(&mut vibe.cushion_volume, percent(map, "cushionVolume")?);
    overlay(&mut vibe.backrest_volume, percent(map, "backrestVolume")?);
    Ok(vibe)
}

fn parse_adjustment(raw: &Value) -> Result<Adjustment, String> {
    let map = object(raw)?;
    let mut adjustment = Adjustment::default();
    for (key, cell) in [
        ("lumbar", &mut adjustment.lumbar),
        ("neckrest", &mut adjustment.neckrest),
    ] {
        let Some(value) = map.get(key).filter(|value| !value.is_null()) else {
            continue;
        };
        let fields = object(value).map_err(|reason| format!("`{key}`: {reason}"))?;
        let mut parsed = PneumaticCell::default();
        overlay(
            &mut parsed.direction,
            choice(fields, "direction", PneumaticDirection::parse)?,
        );
        overlay(&mut parsed.percentage, percent(fields, "percentage")?);
        *cell = parsed;
    }
    Ok(adjustment)
}

fn parse_massage(raw: &Value) -> Result<Massage, String> {
    let map = object(raw)?;
    let mut massage = Massage::default();
    if let Some(value) = map.get("is_active").filter(|value| !value.is_null()) {
        massage.is_active =
            lenient_bool(value).ok_or_else(|| "`is_active` must be a boolean".to_string())?;
    }
    overlay(
        &mut massage.experience,
        choice(map, "experience", MassageExperience::parse)?,
    );
    overlay(
        &mut massage.intensity,
        choice(map, "intensity", MassageIntensity::parse)?,
    );
    Ok(massage)
}

fn parse_thermal(raw: &Value) -> Result<Thermal, String> {
    let map = object(raw)?;
    let mut thermal = Thermal::default();
    overlay(&mut thermal.heating_level, percent(map, "heatingLevel")?);
    overlay(&mut thermal.ventilation_level, percent(map, "ventilationLevel")?);
    Ok(thermal)
}

fn parse_motors(raw: &Value) -> Result<Motors, String> {
    let map = object(raw)?;
    let mut motors = Motors::default();
    for (name, value) in map {
        // unknown motors are not an error, they are simply not ours to drive
        let Some(motor) = MotorName::from_key(name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let fields = object(value).map_err(|reason| format!("motor `{name}`: {reason}"))?;
        let mut parsed = MotorCommand::default();
        overlay(&mut parsed.percentage, percent(fields, "percentage")?);
        overlay(&mut parsed.motion, choice(fields, "type", MotionType::parse)?);
        overlay(
            &mut parsed.direction,
            choice(fields, "direction", MotorDirection::parse)?,
        );
        *motors.get_mut(motor) = parsed;
    }
    Ok(motors)
}

fn parse_seatbelt(raw: &Value) -> Result<Seatbelt, String> {
    let map = object(raw)?;
    let mut seatbelt = Seatbelt::default();
    overlay(&mut seatbelt.percentage, percent(map, "percentage")?);
    Ok(seatbelt)
}

fn object(raw: &Value) -> Result<&Map<String, Value>, String> {
    raw.as_object()
        .ok_or_else(|| "expected an object".to_string())
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn percent(map: &Map<String, Value>, key: &str) -> Result<Option<i64>, String> {
    present(map, key)
        .map(|value| lenient_percent(value).ok_or_else(|| format!("`{key}` must be a number")))
        .transpose()
}

fn text(map: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    present(map, key)
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("`{key}` must be a string"))
        })
        .transpose()
}

fn choice<T>(
    map: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    present(map, key)
        .map(|value| {
            value
                .as_str()
                .and_then(parse)
                .ok_or_else(|| format!("`{key}` has unsupported value {value}"))
        })
        .transpose()
}
