use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use crate::arming::ArmingSequence;
use crate::controllers::PidState;
use crate::telemetry::{Blackbox, BLACKBOX_CAPACITY};

/// Upper end of the normalized throttle range.
pub const MAX_THROTTLE: u32 = 1000;

/// Euler angles in millidegrees, as reported by the attitude sensor.
///
/// Yaw lies in `[0, 360000)`, roll and pitch in `[-180000, 180000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttitudeEstimate {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

impl AttitudeEstimate {
    #[inline]
    pub const fn new() -> Self {
        AttitudeEstimate { roll: 0, pitch: 0, yaw: 0 }
    }
}

/// Desired attitude in millidegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSetpoint {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

/// Per-axis controller output in PWM compare units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisEfforts {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

/// Compare values for the four motor channels.
///
/// A is front-right, B rear-right, C rear-left, D front-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorCommand {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl ActuatorCommand {
    #[inline]
    pub const fn uniform(value: u32) -> Self {
        ActuatorCommand { a: value, b: value, c: value, d: value }
    }

    #[inline]
    pub fn channels(&self) -> [u32; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    Disarmed,
    Arming,
    Armed,
}

/// One tick's view of the command block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Commands {
    pub setpoint: AxisSetpoint,
    pub throttle: u32,
    pub stop: bool,
    pub dump: bool,
    pub arm: bool,
}

/// Operator commands shared between the link context and the control tick.
///
/// Every field is its own atomic so the tick never observes a torn value.
/// Lives in a `static`; the link side writes, the tick only reads (and
/// consumes the one-shot arm and dump requests).
pub struct CommandLink {
    roll: AtomicI32,
    pitch: AtomicI32,
    yaw: AtomicI32,
    throttle: AtomicU32,
    stop: AtomicBool,
    dump: AtomicBool,
    arm: AtomicBool,
    bad_input: AtomicU32,
}

impl CommandLink {
    #[inline]
    pub const fn new() -> Self {
        CommandLink {
            roll: AtomicI32::new(0),
            pitch: AtomicI32::new(0),
            yaw: AtomicI32::new(0),
            throttle: AtomicU32::new(0),
            stop: AtomicBool::new(false),
            dump: AtomicBool::new(false),
            arm: AtomicBool::new(false),
            bad_input: AtomicU32::new(0),
        }
    }

    pub fn set_setpoint(&self, setpoint: AxisSetpoint) {
        self.roll.store(setpoint.roll, Ordering::Relaxed);
        self.pitch.store(setpoint.pitch, Ordering::Relaxed);
        self.yaw.store(setpoint.yaw, Ordering::Relaxed);
    }

    pub fn setpoint(&self) -> AxisSetpoint {
        AxisSetpoint {
            roll: self.roll.load(Ordering::Relaxed),
            pitch: self.pitch.load(Ordering::Relaxed),
            yaw: self.yaw.load(Ordering::Relaxed),
        }
    }

    /// Stores the throttle, saturated to [`MAX_THROTTLE`].
    pub fn set_throttle(&self, throttle: u32) {
        self.throttle.store(throttle.min(MAX_THROTTLE), Ordering::Relaxed);
    }

    pub fn throttle(&self) -> u32 {
        self.throttle.load(Ordering::Relaxed)
    }

    /// Read-modify-write of the throttle as one atomic step, saturated to
    /// [`MAX_THROTTLE`]. `f` is re-run if another context stored a throttle
    /// in the meantime.
    pub fn update_throttle<F>(&self, mut f: F)
        where F: FnMut(u32) -> u32
    {
        let _ = self.throttle.fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(f(t).min(MAX_THROTTLE)));
    }

    /// Moves the throttle by `delta`, kept in `0..=MAX_THROTTLE`.
    pub fn nudge_throttle(&self, delta: i32) {
        self.update_throttle(|t| (t as i64 + delta as i64).clamp(0, MAX_THROTTLE as i64) as u32);
    }

    /// Latches a stop until the next arm request.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Clears a latched stop and asks the loop to start arming.
    pub fn request_arm(&self) {
        self.stop.store(false, Ordering::Release);
        self.arm.store(true, Ordering::Release);
    }

    pub fn take_arm(&self) -> bool {
        self.arm.swap(false, Ordering::AcqRel)
    }

    pub fn request_dump(&self) {
        self.dump.store(true, Ordering::Release);
    }

    pub fn take_dump(&self) -> bool {
        self.dump.swap(false, Ordering::AcqRel)
    }

    pub fn record_bad_input(&self) {
        self.bad_input.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of malformed link messages dropped so far.
    pub fn bad_input(&self) -> u32 {
        self.bad_input.load(Ordering::Relaxed)
    }

    /// Reads every field once and consumes the one-shot requests.
    pub fn snapshot(&self) -> Commands {
        Commands {
            setpoint: self.setpoint(),
            throttle: self.throttle(),
            stop: self.stop_requested(),
            dump: self.take_dump(),
            arm: self.take_arm(),
        }
    }
}

impl Default for CommandLink {
    fn default() -> Self {
        CommandLink::new()
    }
}

/// Everything the control tick mutates, owned by the caller and handed in
/// by `&mut` each tick.
pub struct ControlLoopState<const N: usize = BLACKBOX_CAPACITY> {
    /// Roll, pitch, yaw in that order.
    pub pid: [PidState; 3],
    pub arming: ArmingSequence,
    pub estimate: AttitudeEstimate,
    pub efforts: AxisEfforts,
    pub command: ActuatorCommand,
    pub blackbox: Blackbox<N>,
    pub sensor_faults: u32,
    pub consecutive_faults: u32,
    pub overruns: u32,
    pub ticks: u32,
}

impl<const N: usize> ControlLoopState<N> {
    #[inline]
    pub const fn new() -> Self {
        ControlLoopState {
            pid: [PidState::new(); 3],
            arming: ArmingSequence::new(),
            estimate: AttitudeEstimate::new(),
            efforts: AxisEfforts { roll: 0, pitch: 0, yaw: 0 },
            command: ActuatorCommand::uniform(0),
            blackbox: Blackbox::new(),
            sensor_faults: 0,
            consecutive_faults: 0,
            overruns: 0,
            ticks: 0,
        }
    }

    pub fn arm_state(&self) -> ArmState {
        self.arming.state()
    }

    /// Clears the controller memory; used on every transition into `Armed`.
    pub fn reset_pid(&mut self) {
        self.pid = [PidState::new(); 3];
        self.efforts = AxisEfforts::default();
    }
}

impl<const N: usize> Default for ControlLoopState<N> {
    fn default() -> Self {
        ControlLoopState::new()
    }
}
