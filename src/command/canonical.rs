use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Capability name under which a full seat command travels.
pub const SEAT_ADJUSTMENT_CAPABILITY: &str = "seat_adjustment";
pub const SEAT_COMMAND_KEY: &str = "seatCommand";
pub const DEFAULT_NAVIGATION_TIME: &str = "00:00:00:000";

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? } default $default:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(raw))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(MotorDirection {
    Forward => "forward",
    Backward => "backward",
    Neutral => "neutral",
} default Neutral);

wire_enum!(MotionType {
    Relative => "relative",
    Absolute => "absolute",
} default Relative);

wire_enum!(PneumaticDirection {
    Increase => "increase",
    Decrease => "decrease",
    Neutral => "neutral",
} default Neutral);

wire_enum!(MassageExperience {
    None => "none",
    Relax => "relax",
    Energize => "energize",
    Circulation => "circulation",
} default None);

wire_enum!(MassageIntensity {
    Off => "off",
    Low => "low",
    Medium => "medium",
    High => "high",
} default Off);

wire_enum!(MotorName {
    Track => "Track",
    Backrest => "Backrest",
    Height => "Height",
    Tilt => "Tilt",
    Uba => "UBA",
    Headrest => "Headrest",
    Cla => "CLA",
} default Track);

impl MotorName {
    /// Accepts the wire names plus the telemetry spelling `SeatTilt`.
    pub fn from_key(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("seattilt") {
            return Some(MotorName::Tilt);
        }
        Self::parse(raw)
    }
}

/// Subsystems of a seat command, used to report which ones a fragment activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Vibe,
    PneumaticAdjustment,
    Massage,
    Thermal,
    Motors,
    Seatbelt,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Vibe => "vibe",
            Section::PneumaticAdjustment => "pneumatic_adjustment",
            Section::Massage => "massage",
            Section::Thermal => "thermal",
            Section::Motors => "motors",
            Section::Seatbelt => "seatbelt",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vibe {
    pub action: i64,
    pub navigation_time: String,
    pub main_volume: i64,
    pub vibe_volume: i64,
    pub audio_volume: i64,
    pub cushion_volume: i64,
    pub backrest_volume: i64,
}

impl Default for Vibe {
    fn default() -> Self {
        Self {
            action: 0,
            navigation_time: DEFAULT_NAVIGATION_TIME.to_string(),
            main_volume: 0,
            vibe_volume: 0,
            audio_volume: 0,
            cushion_volume: 0,
            backrest_volume: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PneumaticCell {
    pub direction: PneumaticDirection,
    pub percentage: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub lumbar: PneumaticCell,
    pub neckrest: PneumaticCell,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Massage {
    pub is_active: bool,
    pub experience: MassageExperience,
    pub intensity: MassageIntensity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pneumatic {
    // the wire key is misspelled and consumers depend on it
    #[serde(rename = "adjustement")]
    pub adjustment: Adjustment,
    pub massage: Massage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermal {
    pub heating_level: i64,
    pub ventilation_level: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub percentage: i64,
    #[serde(rename = "type")]
    pub motion: MotionType,
    pub direction: MotorDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motors {
    #[serde(rename = "Track")]
    pub track: MotorCommand,
    #[serde(rename = "Backrest")]
    pub backrest: MotorCommand,
    #[serde(rename = "Height")]
    pub height: MotorCommand,
    #[serde(rename = "Tilt")]
    pub tilt: MotorCommand,
    #[serde(rename = "UBA")]
    pub uba: MotorCommand,
    #[serde(rename = "Headrest")]
    pub headrest: MotorCommand,
    #[serde(rename = "CLA")]
    pub cla: MotorCommand,
}

impl Motors {
    pub fn get(&self, motor: MotorName) -> &MotorCommand {
        match motor {
            MotorName::Track => &self.track,
            MotorName::Backrest => &self.backrest,
            MotorName::Height => &self.height,
            MotorName::Tilt => &self.tilt,
            MotorName::Uba => &self.uba,
            MotorName::Headrest => &self.headrest,
            MotorName::Cla => &self.cla,
        }
    }

    pub fn get_mut(&mut self, motor: MotorName) -> &mut MotorCommand {
        match motor {
            MotorName::Track => &mut self.track,
            MotorName::Backrest => &mut self.backrest,
            MotorName::Height => &mut self.height,
            MotorName::Tilt => &mut self.tilt,
            MotorName::Uba => &mut self.uba,
            MotorName::Headrest => &mut self.headrest,
            MotorName::Cla => &mut self.cla,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seatbelt {
    pub percentage: i64,
}

/// Fully populated seat command. `Default` is the all-neutral command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCommand {
    pub vibe: Vibe,
    pub pneumatic: Pneumatic,
    pub thermal: Thermal,
    pub motors: Motors,
    pub seatbelt: Seatbelt,
}

impl CanonicalCommand {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// `{"seatCommand": {...}}`, the envelope downstream consumers read.
    pub fn to_wire(&self) -> Value {
        json!({ SEAT_COMMAND_KEY: self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_command_matches_legacy_wire_shape() {
        let wire = CanonicalCommand::neutral().to_wire();
        let command = &wire["seatCommand"];
        assert_eq!(command["vibe"]["navigationTime"], DEFAULT_NAVIGATION_TIME);
        assert_eq!(command["vibe"]["backrestVolume"], 0);
        assert_eq!(
            command["pneumatic"]["adjustement"]["lumbar"]["direction"],
            "neutral"
        );
        assert_eq!(command["pneumatic"]["massage"]["is_active"], false);
        assert_eq!(command["pneumatic"]["massage"]["experience"], "none");
        assert_eq!(command["pneumatic"]["massage"]["intensity"], "off");
        assert_eq!(command["thermal"]["ventilationLevel"], 0);
        for motor in ["Track", "Backrest", "Height", "Tilt", "UBA", "Headrest", "CLA"] {
            assert_eq!(command["motors"][motor]["type"], "relative", "{motor}");
            assert_eq!(command["motors"][motor]["direction"], "neutral", "{motor}");
        }
        assert_eq!(command["seatbelt"]["percentage"], 0);
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(MotorDirection::parse(" Forward "), Some(MotorDirection::Forward));
        assert_eq!(MassageIntensity::parse("HIGH"), Some(MassageIntensity::High));
        assert_eq!(MotionType::parse("sideways"), None);
        assert_eq!(MotorName::from_key("uba"), Some(MotorName::Uba));
        assert_eq!(MotorName::from_key("SeatTilt"), Some(MotorName::Tilt));
        assert_eq!(MotorName::from_key("Armrest"), None);
    }
}
