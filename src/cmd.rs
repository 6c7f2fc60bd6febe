//! Command-link lines: `#lx,ly,rx,lt,rt,enter`.
//!
//! Sticks map to attitude setpoints, the trigger difference nudges the
//! throttle, `enter` carries the one-shot requests. Anything else is dropped
//! and counted in [`CommandLink::bad_input`].

use heapless::spsc::Consumer;

use crate::error::InputFault;
use crate::types::{AxisSetpoint, CommandLink, MAX_THROTTLE};

const BUFFER_SIZE: usize = 64;
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const PREFIX: u8 = b'#';
const FIELDS: usize = 6;

/// Stick units to millidegrees.
const STICK_SCALE: i32 = 180;
/// Throttle change per message, per 1000 units of trigger difference.
pub const THROTTLE_RATE: i32 = 10;

const ENTER_DUMP: i32 = 1;
const ENTER_STOP: i32 = 2;

fn parse<T, E>(bytes: &[u8]) -> Result<T, InputFault>
    where T: core::str::FromStr<Err = E>
{
    let v = core::str::from_utf8(bytes).map_err(|_| InputFault::BadNumber)?;
    T::from_str(v.trim()).map_err(|_| InputFault::BadNumber)
}

/// One decoded controller message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub left_x: i32,
    pub left_y: i32,
    pub right_x: i32,
    pub left_trigger: i32,
    pub right_trigger: i32,
    pub enter: i32,
}

impl Frame {
    pub fn parse(line: &[u8]) -> Result<Frame, InputFault> {
        let body = match line.split_first() {
            Some((&PREFIX, body)) => body,
            _ => return Err(InputFault::MissingPrefix),
        };

        let mut values = [0i32; FIELDS];
        let mut count = 0;
        for field in body.split(|b| *b == b',') {
            if count == FIELDS {
                return Err(InputFault::FieldCount);
            }
            values[count] = parse::<i32, _>(field)?;
            count += 1;
        }
        if count != FIELDS {
            return Err(InputFault::FieldCount);
        }

        let [left_x, left_y, right_x, left_trigger, right_trigger, enter] = values;
        Ok(Frame { left_x, left_y, right_x, left_trigger, right_trigger, enter })
    }

    pub fn setpoint(&self) -> AxisSetpoint {
        AxisSetpoint {
            roll: self.left_x.saturating_mul(STICK_SCALE),
            pitch: self.left_y.saturating_mul(STICK_SCALE),
            yaw: self.right_x.saturating_mul(STICK_SCALE),
        }
    }

    /// Throttle change asked for by the trigger difference.
    pub fn throttle_delta(&self, rate: i32) -> i32 {
        let delta = (self.right_trigger as i64 - self.left_trigger as i64) * rate as i64 / 1000;
        delta.clamp(-(MAX_THROTTLE as i64), MAX_THROTTLE as i64) as i32
    }

    pub fn apply(&self, link: &CommandLink, rate: i32) {
        link.set_setpoint(self.setpoint());
        link.nudge_throttle(self.throttle_delta(rate));
        match self.enter {
            ENTER_DUMP => link.request_dump(),
            ENTER_STOP => link.request_stop(),
            _ => {}
        }
    }
}

pub struct CommandParser {
    buffer: [u8; BUFFER_SIZE],
    pos: usize,
    overflow: bool,
    throttle_rate: i32,
}

impl CommandParser {
    #[inline]
    pub const fn new() -> CommandParser {
        CommandParser::with_throttle_rate(THROTTLE_RATE)
    }

    #[inline]
    pub const fn with_throttle_rate(throttle_rate: i32) -> CommandParser {
        CommandParser { buffer: [0; BUFFER_SIZE], pos: 0, overflow: false, throttle_rate }
    }

    #[inline]
    fn push(&mut self, b: u8) -> Option<Result<&[u8], InputFault>> {
        if b == CR || b == LF {
            if self.overflow {
                self.overflow = false;
                self.pos = 0;
                Some(Err(InputFault::Overflow))
            } else if self.pos == 0 {
                None
            } else {
                let len = self.pos;
                self.pos = 0;
                Some(Ok(&self.buffer[0..len]))
            }
        } else {
            if self.pos == BUFFER_SIZE {
                self.overflow = true;
            } else {
                self.buffer[self.pos] = b;
                self.pos += 1;
            }
            None
        }
    }

    /// Feeds one received byte; on a complete line applies it to `link`.
    ///
    /// A malformed line leaves `link` untouched apart from its bad-input
    /// counter, which goes up by exactly one.
    pub fn feed(&mut self, byte: u8, link: &CommandLink) -> Option<Result<Frame, InputFault>> {
        let rate = self.throttle_rate;
        let result = match self.push(byte)? {
            Ok(line) => Frame::parse(line),
            Err(e) => Err(e),
        };
        match result {
            Ok(frame) => frame.apply(link, rate),
            Err(_) => link.record_bad_input(),
        }
        Some(result)
    }

    /// Drains everything the receive interrupt queued up.
    pub fn feed_all<const N: usize>(&mut self,
                                    consumer: &mut Consumer<'_, u8, N>,
                                    link: &CommandLink)
                                    -> usize {
        let mut lines = 0;
        while let Some(byte) = consumer.dequeue() {
            if self.feed(byte, link).is_some() {
                lines += 1;
            }
        }
        lines
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        CommandParser::new()
    }
}
