//! Hardware fakes for unit tests.

use core::convert::Infallible;

use ehal::blocking::delay::DelayMs;
use ehal::blocking::i2c;
use ehal::digital::v2::{OutputPin, ToggleableOutputPin};
use heapless::Vec;

use crate::ahrs::{AttitudeSource, BNO055_ADDR, BNO055_CHIP_ID};
use crate::chrono::Chrono;
use crate::error::SensorFault;
use crate::mixer::MotorCtrl;
use crate::types::{ActuatorCommand, AttitudeEstimate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

/// Register map of a BNO055 that can be told to misbehave.
///
/// Probes first fail `failing_probes` times, then answer a wrong id
/// `unidentified_probes` times, then answer `0xA0`. CALIB_STAT reads walk
/// through `calib` and repeat its last entry.
pub struct FakeI2c {
    pub failing_probes: u32,
    pub unidentified_probes: u32,
    pub probes: u32,
    pub reinits: u32,
    pub calib: Vec<u8, 16>,
    pub calib_reads: u32,
    pub euler: [u8; 6],
    pub euler_reads: u32,
    pub fail_euler: bool,
    pub fail_writes: bool,
    pub writes: Vec<(u8, u8), 16>,
}

impl FakeI2c {
    pub fn new() -> Self {
        FakeI2c {
            failing_probes: 0,
            unidentified_probes: 0,
            probes: 0,
            reinits: 0,
            calib: Vec::new(),
            calib_reads: 0,
            euler: [0; 6],
            euler_reads: 0,
            fail_euler: false,
            fail_writes: false,
            writes: Vec::new(),
        }
    }

    pub fn push_calib(&mut self, status: u8) {
        self.calib.push(status).unwrap();
    }

    fn probe(&mut self) -> Result<u8, FakeBusError> {
        self.probes += 1;
        if self.failing_probes > 0 {
            self.failing_probes -= 1;
            return Err(FakeBusError);
        }
        if self.unidentified_probes > 0 {
            self.unidentified_probes -= 1;
            return Ok(0x00);
        }
        Ok(BNO055_CHIP_ID)
    }

    fn calibration(&mut self) -> u8 {
        let idx = (self.calib_reads as usize).min(self.calib.len().saturating_sub(1));
        self.calib_reads += 1;
        self.calib.get(idx).copied().unwrap_or(0)
    }
}

impl i2c::WriteRead for FakeI2c {
    type Error = FakeBusError;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        assert_eq!(BNO055_ADDR, address);
        match bytes[0] {
            0x00 => buffer[0] = self.probe()?,
            0x35 => buffer[0] = self.calibration(),
            0x1A => {
                self.euler_reads += 1;
                if self.fail_euler {
                    return Err(FakeBusError);
                }
                buffer.copy_from_slice(&self.euler[..buffer.len()]);
            }
            reg => panic!("unexpected read of {:#x}", reg),
        }
        Ok(())
    }
}

impl i2c::Write for FakeI2c {
    type Error = FakeBusError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        assert_eq!(BNO055_ADDR, address);
        if self.fail_writes {
            return Err(FakeBusError);
        }
        self.writes.push((bytes[0], bytes[1])).unwrap();
        Ok(())
    }
}

/// Output pin that counts what was done to it.
#[derive(Debug, Default)]
pub struct FakePin {
    pub high: bool,
    pub rises: u32,
    pub toggles: u32,
}

impl FakePin {
    pub fn new() -> Self {
        FakePin::default()
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.rises += 1;
        Ok(())
    }
}

impl ToggleableOutputPin for FakePin {
    type Error = Infallible;

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.high = !self.high;
        self.toggles += 1;
        Ok(())
    }
}

/// Delay that returns at once and sums up what it was asked for.
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub calls: u32,
    pub total_ms: u32,
}

impl FakeDelay {
    pub fn new() -> Self {
        FakeDelay::default()
    }
}

impl DelayMs<u16> for FakeDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.calls += 1;
        self.total_ms += ms as u32;
    }
}

pub struct FakePwm {
    pub duty: u32,
    pub max: u32,
    pub enabled: bool,
}

impl FakePwm {
    pub fn new() -> Self {
        FakePwm::with_max(20_000)
    }

    pub fn with_max(max: u32) -> Self {
        FakePwm { duty: 0, max, enabled: false }
    }
}

impl ehal::PwmPin for FakePwm {
    type Duty = u32;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u32 {
        self.duty
    }

    fn get_max_duty(&self) -> u32 {
        self.max
    }

    fn set_duty(&mut self, duty: u32) {
        self.duty = duty;
    }
}

/// Clock whose every split lasts `step_us`.
pub struct StepClock {
    pub step_us: u32,
    pub now: u32,
}

impl StepClock {
    pub fn new(step_us: u32) -> Self {
        StepClock { step_us, now: 0 }
    }
}

impl Chrono for StepClock {
    fn split_time_us(&mut self) -> u32 {
        self.now = self.now.wrapping_add(self.step_us);
        self.step_us
    }
}

/// Attitude source with a settable answer.
pub struct ScriptedSource {
    pub estimate: AttitudeEstimate,
    pub fail: bool,
    pub reads: u32,
}

impl ScriptedSource {
    pub fn new(estimate: AttitudeEstimate) -> Self {
        ScriptedSource { estimate, fail: false, reads: 0 }
    }
}

impl AttitudeSource for ScriptedSource {
    fn read_attitude(&mut self) -> Result<AttitudeEstimate, SensorFault> {
        self.reads += 1;
        if self.fail {
            Err(SensorFault::Bus)
        } else {
            Ok(self.estimate)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeSerialError;

/// Serial receiver replaying a byte string, then `WouldBlock`.
pub struct FakeSerial<'a> {
    pub bytes: &'a [u8],
    pub pos: usize,
    pub error_at: Option<usize>,
}

impl<'a> FakeSerial<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        FakeSerial { bytes, pos: 0, error_at: None }
    }
}

impl<'a> ehal::serial::Read<u8> for FakeSerial<'a> {
    type Error = FakeSerialError;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.error_at == Some(self.pos) {
            self.error_at = None;
            return Err(nb::Error::Other(FakeSerialError));
        }
        match self.bytes.get(self.pos) {
            Some(b) => {
                self.pos += 1;
                Ok(*b)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }
}

/// Motor sink remembering the last command.
#[derive(Debug, Default)]
pub struct RecordingMotors {
    pub last: ActuatorCommand,
    pub writes: u32,
}

impl RecordingMotors {
    pub fn new() -> Self {
        RecordingMotors::default()
    }
}

impl MotorCtrl for RecordingMotors {
    fn set_duty(&mut self, cmd: &ActuatorCommand) {
        self.last = *cmd;
        self.writes += 1;
    }
}

/// Serial transmitter collecting everything written to it.
pub struct FakeSerialTx {
    pub sent: Vec<u8, 512>,
    pub flushes: u32,
    pub stalls: u32,
    /// Answer `WouldBlock` before every accepted byte.
    pub stall: bool,
    stalled: bool,
    pub fail: bool,
}

impl FakeSerialTx {
    pub fn new() -> Self {
        FakeSerialTx { sent: Vec::new(), flushes: 0, stalls: 0, stall: false, stalled: false, fail: false }
    }

    pub fn stalling() -> Self {
        FakeSerialTx { stall: true, ..FakeSerialTx::new() }
    }
}

impl ehal::serial::Write<u8> for FakeSerialTx {
    type Error = FakeSerialError;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if self.fail {
            return Err(nb::Error::Other(FakeSerialError));
        }
        if self.stall && !self.stalled {
            self.stalled = true;
            self.stalls += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.stalled = false;
        self.sent.push(word).map_err(|_| nb::Error::Other(FakeSerialError))
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}
