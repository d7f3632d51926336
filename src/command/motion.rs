use super::canonical::{MotionType, MotorCommand, MotorDirection};
use crate::shared::serde_ext::{clamp_percent, PERCENT_MAX, PERCENT_MIN};

pub const DEFAULT_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAmount {
    Step(i64),
    /// All the way to the end stop in the move direction.
    Fully,
    /// Absolute position; direction is implied by where it lies.
    Target(i64),
}

impl Default for MoveAmount {
    fn default() -> Self {
        MoveAmount::Step(DEFAULT_STEP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorMove {
    pub previous: i64,
    pub new: i64,
    pub delta: i64,
}

impl MotorMove {
    pub fn between(previous: i64, new: i64) -> Self {
        let previous = clamp_percent(previous);
        let new = clamp_percent(new);
        Self {
            previous,
            new,
            delta: new - previous,
        }
    }

    pub fn direction(&self) -> MotorDirection {
        match self.delta {
            d if d > 0 => MotorDirection::Forward,
            d if d < 0 => MotorDirection::Backward,
            _ => MotorDirection::Neutral,
        }
    }

    /// Relative motor instruction that performs this move.
    pub fn to_command(&self) -> MotorCommand {
        MotorCommand {
            percentage: self.delta.abs(),
            motion: MotionType::Relative,
            direction: self.direction(),
        }
    }
}

pub fn plan_motor_move(current: i64, direction: MotorDirection, amount: MoveAmount) -> MotorMove {
    let current = clamp_percent(current);
    let target = match (amount, direction) {
        (MoveAmount::Target(value), _) => value,
        (_, MotorDirection::Neutral) => current,
        (MoveAmount::Fully, MotorDirection::Forward) => PERCENT_MAX,
        (MoveAmount::Fully, MotorDirection::Backward) => PERCENT_MIN,
        (MoveAmount::Step(step), MotorDirection::Forward) => {
            current.saturating_add(step.saturating_abs())
        }
        (MoveAmount::Step(step), MotorDirection::Backward) => {
            current.saturating_sub(step.saturating_abs())
        }
    };
    MotorMove::between(current, target)
}
