//! Fixed-point attitude PID.
//!
//! Errors are in millidegrees; gains are integers scaled by [`PID_SCALE`], so
//! an effort comes out directly in PWM compare units.

use crate::types::{AttitudeEstimate, AxisEfforts, AxisSetpoint};

/// Shared fixed-point divisor for gains, throttle gain included.
pub const PID_SCALE: i32 = 100_000;

/// Divisor of the scaled pre-accumulation pass.
const INTEGRAL_PRESCALE: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PidGains {
    pub kp: i32,
    pub ki: i32,
    pub kd: i32,
}

impl PidGains {
    #[inline]
    pub const fn new(kp: i32, ki: i32, kd: i32) -> Self {
        PidGains { kp, ki, kd }
    }
}

/// Controller memory of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PidState {
    pub error: i32,
    pub integral: i32,
    pub derivative: i32,
    pub last_error: i32,
}

impl PidState {
    #[inline]
    pub const fn new() -> Self {
        PidState { error: 0, integral: 0, derivative: 0, last_error: 0 }
    }
}

/// How the integral of an axis is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Windup {
    /// `integral += error / 1000`, clamp to `±limit`, then `integral += error`.
    Clamped(i32),
    /// `integral += error`, nothing else. Yaw runs like this.
    Unbounded,
}

// "attitude" controller, roll/pitch/yaw in that order
// returns efforts, PidState updated in place
pub fn attitude(
    estimate: &AttitudeEstimate,
    setpoint: &AxisSetpoint,
    state: &mut [PidState; 3],
    gains: &[PidGains; 3],
    max_integral: i32,
) -> AxisEfforts {
    let [roll, pitch, yaw] = state;
    AxisEfforts {
        roll: axis(estimate.roll, setpoint.roll, roll, &gains[0], Windup::Clamped(max_integral)),
        pitch: axis(estimate.pitch, setpoint.pitch, pitch, &gains[1], Windup::Clamped(max_integral)),
        yaw: axis(estimate.yaw, setpoint.yaw, yaw, &gains[2], Windup::Unbounded),
    }
}

/// One PID step. Mutates `state` exactly once and returns the effort.
///
/// The error is *measured minus desired* and the weighted sum is negated, so
/// a positive effort pushes the measurement back down toward the setpoint.
pub fn axis(
    measurement: i32,
    setpoint: i32,
    state: &mut PidState,
    gains: &PidGains,
    windup: Windup,
) -> i32 {
    let error = measurement.saturating_sub(setpoint);

    let mut integral = state.integral;
    if let Windup::Clamped(limit) = windup {
        let limit = limit.max(0);
        integral = integral
            .saturating_add(error / INTEGRAL_PRESCALE)
            .clamp(-limit, limit);
    }
    // raw pass is not clamped
    integral = integral.saturating_add(error);

    let derivative = error.saturating_sub(state.last_error);

    state.error = error;
    state.integral = integral;
    state.derivative = derivative;
    state.last_error = error;

    let sum = (gains.kp as i64 * error as i64)
        .saturating_add(gains.ki as i64 * integral as i64)
        .saturating_add(gains.kd as i64 * derivative as i64);
    saturate(sum.saturating_neg() / PID_SCALE as i64)
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
