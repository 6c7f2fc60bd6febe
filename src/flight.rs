//! The control tick: acquire, control, mix, actuate, record.

use cortex_m_log::printer::Printer;
use ehal::blocking::delay::DelayMs;
use ehal::digital::v2::ToggleableOutputPin;

use crate::ahrs::AttitudeSource;
use crate::arming;
use crate::chrono::Chrono;
use crate::config::{FlightConfig, StalePolicy};
use crate::controllers;
use crate::error::{ArmingError, ConfigError};
use crate::mixer::{self, MotorCtrl};
use crate::retry::RetryPolicy;
use crate::telemetry::Sample;
use crate::types::{ActuatorCommand, ArmState, CommandLink, Commands, ControlLoopState};

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub command: ActuatorCommand,
    pub arm_state: ArmState,
    /// Forwarded to whoever owns the telemetry link.
    pub dump_requested: bool,
    pub sensor_ok: bool,
}

pub struct FlightLoop<'a, S, M, C> {
    source: S,
    motors: M,
    chrono: C,
    link: &'a CommandLink,
    config: FlightConfig,
}

impl<'a, S, M, C> FlightLoop<'a, S, M, C>
    where S: AttitudeSource,
          M: MotorCtrl,
          C: Chrono
{
    /// Refuses a config that fails [`FlightConfig::validate`].
    pub fn new(source: S,
               motors: M,
               chrono: C,
               link: &'a CommandLink,
               config: FlightConfig)
               -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(FlightLoop { source, motors, chrono, link, config })
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn release(self) -> (S, M, C) {
        (self.source, self.motors, self.chrono)
    }

    /// Runs one control cycle. Steps happen strictly in order and each
    /// one sees the result of the previous.
    pub fn tick<P, const N: usize>(&mut self, state: &mut ControlLoopState<N>, log: &mut P) -> TickReport
        where P: Printer
    {
        self.chrono.reset();
        let cmds = self.link.snapshot();
        self.apply_requests(state, &cmds, log);

        let sensor_ok = self.acquire(state, log);

        let command = match state.arm_state() {
            ArmState::Armed => {
                if sensor_ok || self.config.stale == StalePolicy::HoldEstimate {
                    state.efforts = controllers::attitude(&state.estimate,
                                                          &cmds.setpoint,
                                                          &mut state.pid,
                                                          &self.config.gains,
                                                          self.config.max_integral);
                }
                mixer::mix(cmds.throttle, &state.efforts, ArmState::Armed, cmds.stop, &self.config.mixer)
            }
            ArmState::Arming => {
                if state.arming.update(cmds.setpoint.roll, &self.config.arming) {
                    self.on_armed(state, log);
                }
                arming::pulse(&self.config.arming)
            }
            ArmState::Disarmed => {
                mixer::mix(cmds.throttle, &state.efforts, ArmState::Disarmed, cmds.stop, &self.config.mixer)
            }
        };
        self.motors.set_duty(&command);
        state.command = command;

        let sample = Sample {
            pitch: state.estimate.pitch,
            pitch_set: cmds.setpoint.pitch,
            roll: state.estimate.roll,
            roll_set: cmds.setpoint.roll,
        };
        state.blackbox.offer(sample, self.config.blackbox_divider);
        state.ticks = state.ticks.wrapping_add(1);

        let elapsed = self.chrono.split_time_us();
        if elapsed > self.config.tick_period_us {
            state.overruns += 1;
            warn!(log, "overrun: {} us", elapsed);
        }
        debug!(log, ":{};{};{}", state.estimate.yaw, state.estimate.pitch, state.estimate.roll);

        TickReport { command, arm_state: state.arm_state(), dump_requested: cmds.dump, sensor_ok }
    }

    /// Blocks until the ESCs are armed: writes the arm pulse, toggles
    /// `indicator` and waits between readiness checks.
    ///
    /// A latched stop or an exhausted `policy` leave the loop disarmed with
    /// the outputs at the floor.
    pub fn arm<P, IND, D, const N: usize>(&mut self,
                                          state: &mut ControlLoopState<N>,
                                          indicator: &mut IND,
                                          delay: &mut D,
                                          policy: RetryPolicy,
                                          log: &mut P)
                                          -> Result<(), ArmingError>
        where P: Printer,
              IND: ToggleableOutputPin,
              D: DelayMs<u16>
    {
        if state.arming.is_armed() {
            return Ok(());
        }
        state.arming.request_arm();
        info!(log, "arming");

        let pulse = arming::pulse(&self.config.arming);
        let mut attempt = 0;
        loop {
            if self.link.stop_requested() {
                self.abort(state);
                warn!(log, "arming stopped");
                return Err(ArmingError::Stopped);
            }
            if !policy.allows(attempt) {
                self.abort(state);
                error!(log, "arming gave up after {} pulses", attempt);
                return Err(ArmingError::TimedOut);
            }
            attempt += 1;

            self.motors.set_duty(&pulse);
            state.command = pulse;
            let _ = indicator.toggle();
            delay.delay_ms(self.config.arming.pulse_interval_ms);

            if state.arming.update(self.link.setpoint().roll, &self.config.arming) {
                self.on_armed(state, log);
                return Ok(());
            }
        }
    }

    fn apply_requests<P: Printer, const N: usize>(&mut self,
                                                  state: &mut ControlLoopState<N>,
                                                  cmds: &Commands,
                                                  log: &mut P) {
        if cmds.stop {
            if state.arm_state() != ArmState::Disarmed {
                state.arming.disarm();
                warn!(log, "stop: disarmed");
            }
        } else if cmds.arm && state.arming.request_arm() {
            info!(log, "arming");
        }
    }

    fn acquire<P: Printer, const N: usize>(&mut self, state: &mut ControlLoopState<N>, log: &mut P) -> bool {
        match self.source.read_attitude() {
            Ok(estimate) => {
                state.estimate = estimate;
                state.consecutive_faults = 0;
                true
            }
            Err(e) => {
                state.sensor_faults = state.sensor_faults.wrapping_add(1);
                state.consecutive_faults = state.consecutive_faults.saturating_add(1);
                if state.consecutive_faults == 1 {
                    error!(log, "sensor: {}", e);
                }
                if let Some(limit) = self.config.fault_limit {
                    if state.consecutive_faults >= limit && state.arm_state() != ArmState::Disarmed {
                        state.arming.disarm();
                        error!(log, "sensor lost for {} ticks, disarmed", state.consecutive_faults);
                    }
                }
                false
            }
        }
    }

    fn on_armed<P: Printer, const N: usize>(&mut self, state: &mut ControlLoopState<N>, log: &mut P) {
        state.reset_pid();
        self.link.set_throttle(0);
        info!(log, "armed");
    }

    fn abort<const N: usize>(&mut self, state: &mut ControlLoopState<N>) {
        state.arming.disarm();
        let floor = ActuatorCommand::uniform(self.config.mixer.floor);
        self.motors.set_duty(&floor);
        state.command = floor;
    }
}
