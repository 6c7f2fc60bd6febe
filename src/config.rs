//! Static tuning.
//!
//! The `configuration` feature group picks [`FlightConfig::DEFAULT`]: the
//! bench profile keeps the ceiling low enough to run props-off on the desk.

use crate::controllers::PidGains;
use crate::error::ConfigError;

/// What a tick does with its effort when the sensor read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Run the controller on the last valid estimate.
    HoldEstimate,
    /// Skip the controller and mix the previous efforts again.
    HoldEfforts,
}

/// Channel envelope and geometry constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerConfig {
    /// Throttle to compare units, scaled by `PID_SCALE`.
    pub throttle_gain: i32,
    /// Per-channel ESC trim, A B C D.
    pub offsets: [i32; 4],
    /// Arming minimum; the output of a stopped or disarmed channel.
    pub floor: u32,
    /// Top speed limit, kept well under `absolute_max`.
    pub ceiling: u32,
    /// What the ESC accepts at all.
    pub absolute_max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmingConfig {
    /// Value written to every channel while arming.
    pub arm_pulse: u32,
    /// Roll setpoint (millidegrees) the operator must reach to finish arming.
    pub arm_threshold: i32,
    /// Delay between arming pulses of the blocking routine.
    pub pulse_interval_ms: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightConfig {
    /// Roll, pitch, yaw.
    pub gains: [PidGains; 3],
    /// Anti-windup bound of the roll and pitch integrals.
    pub max_integral: i32,
    pub mixer: MixerConfig,
    pub arming: ArmingConfig,
    /// A blackbox sample is taken every this many ticks.
    pub blackbox_divider: u16,
    pub stale: StalePolicy,
    /// Consecutive failed reads before the loop disarms. `None` never does.
    pub fault_limit: Option<u32>,
    /// Control period; a longer tick counts as an overrun.
    pub tick_period_us: u32,
}

const MIXER: MixerConfig = MixerConfig {
    throttle_gain: 54_000,
    offsets: [960, 960, 960, 960],
    floor: 960,
    ceiling: 1500,
    absolute_max: 2000,
};

const ARMING: ArmingConfig = ArmingConfig {
    arm_pulse: 1000,
    arm_threshold: 10_000,
    pulse_interval_ms: 125,
};

impl FlightConfig {
    pub const DRONE: FlightConfig = FlightConfig {
        gains: [
            PidGains::new(1_000, 10, 20_000),
            PidGains::new(1_000, 10, 20_000),
            PidGains::new(500, 0, 0),
        ],
        max_integral: 100_000,
        mixer: MIXER,
        arming: ARMING,
        blackbox_divider: 3,
        stale: StalePolicy::HoldEstimate,
        fault_limit: Some(50),
        tick_period_us: 10_000,
    };

    pub const DEV: FlightConfig = FlightConfig {
        gains: [
            PidGains::new(500, 5, 10_000),
            PidGains::new(500, 5, 10_000),
            PidGains::new(250, 0, 0),
        ],
        mixer: MixerConfig {
            throttle_gain: 24_000,
            ceiling: 1200,
            ..MIXER
        },
        ..FlightConfig::DRONE
    };

    #[cfg(configuration = "configuration_drone")]
    pub const DEFAULT: FlightConfig = FlightConfig::DRONE;
    #[cfg(configuration = "configuration_dev")]
    pub const DEFAULT: FlightConfig = FlightConfig::DEV;

    /// Checks the envelope the mixer and the loop rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mixer = &self.mixer;
        if mixer.floor > mixer.ceiling {
            return Err(ConfigError::FloorAboveCeiling);
        }
        if mixer.ceiling >= mixer.absolute_max {
            return Err(ConfigError::CeilingAtHardwareLimit);
        }
        if self.arming.arm_pulse < mixer.floor || self.arming.arm_pulse > mixer.ceiling {
            return Err(ConfigError::ArmPulseOutsideEnvelope);
        }
        if self.blackbox_divider == 0 {
            return Err(ConfigError::ZeroDivider);
        }
        if self.max_integral < 0 {
            return Err(ConfigError::NegativeIntegralLimit);
        }
        Ok(())
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        FlightConfig::DEFAULT
    }
}
