use heapless::spsc::{Consumer, Producer, Queue};

/// Receive pipe depth; holds one byte less than this.
pub const PIPE_SIZE: usize = 64;

pub type Pipe = Queue<u8, PIPE_SIZE>;
pub type Tx<'a> = Producer<'a, u8, PIPE_SIZE>;
pub type Rx<'a> = Consumer<'a, u8, PIPE_SIZE>;

/// Splits a pipe, typically a `static` one, into its two ends.
#[inline]
pub fn pipe(queue: &mut Pipe) -> (Tx<'_>, Rx<'_>) {
    queue.split()
}

/// What a receive interrupt saw while draining the UART.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub received: u32,
    pub dropped: u32,
    pub errors: u32,
}

/// Moves every ready byte from `rx` into the pipe. Runs in the receive
/// interrupt; bytes that do not fit are dropped, read errors are counted
/// and skipped.
pub fn pump<R, E>(rx: &mut R, producer: &mut Tx<'_>) -> PumpStats
    where R: ehal::serial::Read<u8, Error = E>
{
    let mut stats = PumpStats::default();
    loop {
        match rx.read() {
            Ok(b) => {
                stats.received += 1;
                if producer.enqueue(b).is_err() {
                    stats.dropped += 1;
                }
            }
            Err(nb::Error::WouldBlock) => break,
            Err(nb::Error::Other(_)) => stats.errors += 1,
        }
    }
    stats
}
