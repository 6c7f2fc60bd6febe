//! BNO055 absolute orientation sensor.
//!
//! The chip runs its own fusion; this side only brings it up in NDOF mode,
//! waits for system calibration and reads the Euler output.

use ehal::blocking::delay::DelayMs;
use ehal::blocking::i2c;
use ehal::digital::v2::{OutputPin, ToggleableOutputPin};

use crate::error::SensorFault;
use crate::retry::RetryPolicy;
use crate::types::AttitudeEstimate;

/// 7-bit bus address with COM3 low.
pub const BNO055_ADDR: u8 = 0x28;
/// Content of the chip id register.
pub const BNO055_CHIP_ID: u8 = 0xA0;

const REG_CHIP_ID: u8 = 0x00;
const REG_EULER_LSB: u8 = 0x1A;
const REG_CALIB_STAT: u8 = 0x35;
const REG_OPR_MODE: u8 = 0x3D;

const MODE_CONFIG: u8 = 0x00;
const MODE_NDOF: u8 = 0x0C;

const BOOT_DELAY_MS: u16 = 1000;
const MODE_SETTLE_MS: u16 = 25;
const CALIBRATION_POLL_MS: u16 = 10;

/// Anything that yields one attitude snapshot per call.
pub trait AttitudeSource {
    fn read_attitude(&mut self) -> Result<AttitudeEstimate, SensorFault>;
}

/// 1/16 degree sensor units to millidegrees, truncating toward zero.
#[inline]
pub fn millidegrees(raw: i16) -> i32 {
    raw as i32 * 1000 / 16
}

/// Euler block in wire order: yaw, roll, pitch, each little-endian.
pub fn decode_euler(data: &[u8; 6]) -> AttitudeEstimate {
    let yaw = i16::from_le_bytes([data[0], data[1]]);
    let roll = i16::from_le_bytes([data[2], data[3]]);
    let pitch = i16::from_le_bytes([data[4], data[5]]);
    AttitudeEstimate {
        roll: millidegrees(roll),
        pitch: millidegrees(pitch),
        yaw: millidegrees(yaw),
    }
}

/// System calibration is bits 7:6 of CALIB_STAT; 3 means converged.
#[inline]
pub fn system_calibrated(status: u8) -> bool {
    (status >> 6) & 0x03 == 0x03
}

pub struct Bno055<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Bno055<I2C>
    where I2C: i2c::WriteRead<Error = E> + i2c::Write<Error = E>
{
    /// Brings the sensor up without touching the bus driver between probes.
    pub fn new<RST, IND, D>(i2c: I2C,
                            reset: &mut RST,
                            indicator: &mut IND,
                            delay: &mut D,
                            policy: RetryPolicy)
                            -> Result<Self, SensorFault>
        where RST: ToggleableOutputPin,
              IND: OutputPin,
              D: DelayMs<u16>
    {
        Self::new_with_reinit(i2c, reset, indicator, delay, policy, |i2c| i2c)
    }

    /// Full bring-up; blocks until the sensor is calibrated.
    ///
    /// 1. Toggle `reset`, wait for boot, hand the bus to `reinit` and probe
    ///    the chip id, until it answers `0xA0`.
    /// 2. CONFIG mode, then NDOF mode, each followed by a settle delay.
    /// 3. Poll CALIB_STAT with `indicator` lit until system calibration is
    ///    complete.
    ///
    /// With [`RetryPolicy::UNBOUNDED`] steps 1 and 3 never give up, so the
    /// only error is a failed mode write. A bounded policy fails with
    /// `NotDetected` or `Uncalibrated` once its attempts are spent.
    pub fn new_with_reinit<RST, IND, D, F>(mut i2c: I2C,
                                           reset: &mut RST,
                                           indicator: &mut IND,
                                           delay: &mut D,
                                           policy: RetryPolicy,
                                           mut reinit: F)
                                           -> Result<Self, SensorFault>
        where RST: ToggleableOutputPin,
              IND: OutputPin,
              D: DelayMs<u16>,
              F: FnMut(I2C) -> I2C
    {
        let mut attempt = 0;
        loop {
            if !policy.allows(attempt) {
                return Err(SensorFault::NotDetected);
            }
            attempt = attempt.saturating_add(1);

            let _ = reset.toggle();
            delay.delay_ms(BOOT_DELAY_MS);
            i2c = reinit(i2c);

            let mut id = [0u8; 1];
            if i2c.write_read(BNO055_ADDR, &[REG_CHIP_ID], &mut id).is_ok()
               && id[0] == BNO055_CHIP_ID
            {
                break;
            }
        }

        let mut bno = Bno055 { i2c, address: BNO055_ADDR };
        bno.set_mode(MODE_CONFIG, delay)?;
        bno.set_mode(MODE_NDOF, delay)?;
        bno.wait_calibrated(indicator, delay, policy)?;
        Ok(bno)
    }

    fn set_mode<D: DelayMs<u16>>(&mut self, mode: u8, delay: &mut D) -> Result<(), SensorFault> {
        self.write_register(REG_OPR_MODE, mode)?;
        delay.delay_ms(MODE_SETTLE_MS);
        Ok(())
    }

    fn wait_calibrated<IND, D>(&mut self,
                               indicator: &mut IND,
                               delay: &mut D,
                               policy: RetryPolicy)
                               -> Result<(), SensorFault>
        where IND: OutputPin,
              D: DelayMs<u16>
    {
        let mut attempt = 0;
        loop {
            if !policy.allows(attempt) {
                return Err(SensorFault::Uncalibrated);
            }
            attempt = attempt.saturating_add(1);

            let _ = indicator.set_high();
            let status = self.calibration_status();
            let _ = indicator.set_low();

            // a failed read is just another unconverged poll
            if let Ok(status) = status {
                if system_calibrated(status) {
                    return Ok(());
                }
            }
            delay.delay_ms(CALIBRATION_POLL_MS);
        }
    }

    /// Raw CALIB_STAT: system, gyro, accel, mag, two bits each.
    pub fn calibration_status(&mut self) -> Result<u8, SensorFault> {
        let mut status = [0u8; 1];
        self.read_registers(REG_CALIB_STAT, &mut status)?;
        Ok(status[0])
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorFault> {
        self.i2c.write(self.address, &[reg, value]).map_err(|_| SensorFault::Bus)
    }

    fn read_registers(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), SensorFault> {
        self.i2c.write_read(self.address, &[reg], buffer).map_err(|_| SensorFault::Bus)
    }
}

impl<I2C, E> AttitudeSource for Bno055<I2C>
    where I2C: i2c::WriteRead<Error = E> + i2c::Write<Error = E>
{
    /// One 6-byte burst from EULER_LSB. No retry; the caller decides what a
    /// failed read means for the tick.
    fn read_attitude(&mut self) -> Result<AttitudeEstimate, SensorFault> {
        let mut data = [0u8; 6];
        self.read_registers(REG_EULER_LSB, &mut data)?;
        Ok(decode_euler(&data))
    }
}
