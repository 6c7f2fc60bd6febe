use crate::config::ArmingConfig;
use crate::types::{ActuatorCommand, ArmState};

/// Disarmed -> Arming -> Armed, and back to Disarmed on stop.
///
/// Only [`request_arm`](Self::request_arm) leaves `Disarmed`, only the
/// readiness condition leaves `Arming` forward, and only
/// [`disarm`](Self::disarm) leaves `Armed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmingSequence {
    state: ArmState,
}

impl ArmingSequence {
    #[inline]
    pub const fn new() -> Self {
        ArmingSequence { state: ArmState::Disarmed }
    }

    #[inline]
    pub fn state(&self) -> ArmState {
        self.state
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state == ArmState::Armed
    }

    /// Returns `true` if the request started arming.
    pub fn request_arm(&mut self) -> bool {
        if self.state == ArmState::Disarmed {
            self.state = ArmState::Arming;
            true
        } else {
            false
        }
    }

    /// Feeds the readiness setpoint; returns `true` on the Arming -> Armed edge.
    pub fn update(&mut self, roll_setpoint: i32, config: &ArmingConfig) -> bool {
        if self.state == ArmState::Arming && roll_setpoint >= config.arm_threshold {
            self.state = ArmState::Armed;
            true
        } else {
            false
        }
    }

    /// Stop or explicit disarm, from any state.
    pub fn disarm(&mut self) {
        self.state = ArmState::Disarmed;
    }
}

impl Default for ArmingSequence {
    fn default() -> Self {
        ArmingSequence::new()
    }
}

/// What every channel carries while arming.
#[inline]
pub fn pulse(config: &ArmingConfig) -> ActuatorCommand {
    ActuatorCommand::uniform(config.arm_pulse)
}
