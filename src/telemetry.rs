use core::fmt::{self, Write};

use heapless::Vec;

/// Blackbox size when none is given; 16 bytes per sample.
pub const BLACKBOX_CAPACITY: usize = 1024;

/// One flight-data sample, millidegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub pitch: i32,
    pub pitch_set: i32,
    pub roll: i32,
    pub roll_set: i32,
}

/// Fixed-size flight data log, drained by the telemetry side.
///
/// Once full every further sample is dropped until [`dump`](Self::dump) or
/// [`clear`](Self::clear) empties it.
pub struct Blackbox<const N: usize = BLACKBOX_CAPACITY> {
    samples: Vec<Sample, N>,
    counter: u16,
}

impl<const N: usize> Blackbox<N> {
    #[inline]
    pub const fn new() -> Self {
        Blackbox { samples: Vec::new(), counter: 0 }
    }

    /// Records a sample; a no-op when full.
    #[inline]
    pub fn record(&mut self, sample: Sample) {
        let _ = self.samples.push(sample);
    }

    /// Counts one tick and records `sample` on every `divider`-th call.
    pub fn offer(&mut self, sample: Sample, divider: u16) {
        self.counter += 1;
        if self.counter >= divider {
            self.counter = 0;
            self.record(sample);
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Writes `pitch,pitch_set,roll,roll_set\r\n` per sample, then empties
    /// the log. On a write error the log is kept for the next attempt.
    pub fn dump<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        for s in self.samples.iter() {
            write!(out, "{},{},{},{}\r\n", s.pitch, s.pitch_set, s.roll, s.roll_set)?;
        }
        self.samples.clear();
        Ok(())
    }
}

impl<const N: usize> Default for Blackbox<N> {
    fn default() -> Self {
        Blackbox::new()
    }
}
