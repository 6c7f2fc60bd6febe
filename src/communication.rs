//! Telemetry transmit side: text lines out over a blocking serial port.

use core::fmt;

/// `fmt::Write` over an `embedded-hal` serial transmitter, so a blackbox
/// dump can go straight to the UART.
pub struct SerialWriter<W> {
    tx: W,
}

impl<W> SerialWriter<W>
    where W: ehal::serial::Write<u8>
{
    pub fn new(tx: W) -> Self {
        SerialWriter { tx }
    }

    pub fn flush(&mut self) -> Result<(), W::Error> {
        nb::block!(self.tx.flush())
    }

    pub fn release(self) -> W {
        self.tx
    }
}

impl<W> fmt::Write for SerialWriter<W>
    where W: ehal::serial::Write<u8>
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            nb::block!(self.tx.write(b)).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Blackbox, Sample};
    use crate::test_utils::*;
    use core::fmt::Write;

    #[test]
    fn test_write_blocks_through_wouldblock() {
        let mut writer = SerialWriter::new(FakeSerialTx::stalling());
        write!(writer, "ok {}", 7).unwrap();
        writer.flush().unwrap();
        let tx = writer.release();
        assert_eq!(b"ok 7", tx.sent.as_slice());
        assert!(tx.stalls > 0);
        assert_eq!(1, tx.flushes);
    }

    #[test]
    fn test_blackbox_dump_to_uart() {
        let mut blackbox: Blackbox<4> = Blackbox::new();
        blackbox.record(Sample { pitch: 1, pitch_set: 2, roll: -3, roll_set: 4 });
        let mut writer = SerialWriter::new(FakeSerialTx::new());
        blackbox.dump(&mut writer).unwrap();
        assert_eq!(b"1,2,-3,4\r\n", writer.release().sent.as_slice());
        assert!(blackbox.is_empty());
    }

    /// A transmit error keeps the samples for a later attempt.
    #[test]
    fn test_blackbox_dump_error_keeps_samples() {
        let mut blackbox: Blackbox<4> = Blackbox::new();
        blackbox.record(Sample::default());
        let mut tx = FakeSerialTx::new();
        tx.fail = true;
        let mut writer = SerialWriter::new(tx);
        assert!(blackbox.dump(&mut writer).is_err());
        assert_eq!(1, blackbox.len());
    }
}
