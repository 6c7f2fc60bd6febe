/// Tick stopwatch.
pub trait Chrono {
    /// Starts new cycle
    fn reset(&mut self) {
        self.split_time_us();
    }

    /// Get elapsed time (us) since last measurement and start new cycle
    fn split_time_us(&mut self) -> u32;
}

/// Stopwatch over a free-running cycle counter, e.g.
/// `CycleClock::new(sysclk_hz, cortex_m::peripheral::DWT::cycle_count)`.
pub struct CycleClock<F> {
    counter: F,
    hz: u32,
    last: u32,
}

impl<F> CycleClock<F>
    where F: Fn() -> u32
{
    pub fn new(hz: u32, counter: F) -> Self {
        let last = counter();
        CycleClock { counter, hz, last }
    }
}

impl<F> Chrono for CycleClock<F>
    where F: Fn() -> u32
{
    fn split_time_us(&mut self) -> u32 {
        let now = (self.counter)();
        let duration = now.wrapping_sub(self.last);
        self.last = now;
        if self.hz == 0 {
            return 0;
        }
        (duration as u64 * 1_000_000 / self.hz as u64) as u32
    }
}
