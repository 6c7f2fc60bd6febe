//! Fault taxonomy.
//!
//! Stopping or disarming is not represented here: that is a designed state,
//! visible as every channel sitting at the floor.

use core::fmt;

/// Attitude sensor faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Register read or write failed on the bus.
    Bus,
    /// The chip id never matched within the retry policy.
    NotDetected,
    /// System calibration never converged within the retry policy.
    Uncalibrated,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorFault::Bus => f.write_str("sensor bus access failed"),
            SensorFault::NotDetected => f.write_str("sensor not detected"),
            SensorFault::Uncalibrated => f.write_str("sensor calibration did not converge"),
        }
    }
}

/// Malformed command-link messages. The message is dropped and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFault {
    /// Line does not start with `#`.
    MissingPrefix,
    /// Not exactly six comma separated fields.
    FieldCount,
    /// A field is not a signed decimal integer.
    BadNumber,
    /// Line longer than the receive buffer.
    Overflow,
}

impl fmt::Display for InputFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFault::MissingPrefix => f.write_str("missing '#' prefix"),
            InputFault::FieldCount => f.write_str("expected six fields"),
            InputFault::BadNumber => f.write_str("field is not an integer"),
            InputFault::Overflow => f.write_str("line too long"),
        }
    }
}

/// Inconsistent [`FlightConfig`](crate::config::FlightConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    FloorAboveCeiling,
    /// The safety ceiling must stay strictly below the ESC maximum.
    CeilingAtHardwareLimit,
    ArmPulseOutsideEnvelope,
    ZeroDivider,
    NegativeIntegralLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::FloorAboveCeiling => "floor above ceiling",
            ConfigError::CeilingAtHardwareLimit => "ceiling not below the actuator maximum",
            ConfigError::ArmPulseOutsideEnvelope => "arm pulse outside floor..ceiling",
            ConfigError::ZeroDivider => "blackbox divider is zero",
            ConfigError::NegativeIntegralLimit => "negative integral limit",
        };
        f.write_str(msg)
    }
}

/// Why the blocking arming routine returned without arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingError {
    /// A stop is latched on the command link.
    Stopped,
    /// The readiness condition never held within the retry policy.
    TimedOut,
}

impl fmt::Display for ArmingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmingError::Stopped => f.write_str("stop requested while arming"),
            ArmingError::TimedOut => f.write_str("arming readiness not reached"),
        }
    }
}
