//! Suspension for hosted builds.

use std::{thread, time::Duration};

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] backed by [`std::thread::sleep`].
///
/// The calling thread is parked, so the scheduler is free to run other work
/// while an acquisition waits on the converter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl DelayNs for ThreadSleep {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Lock relax strategy that hands the CPU back to the scheduler.
///
/// Used by [`SharedDevice`](crate::device::SharedDevice) in hosted builds, where a
/// waiting reader may sit behind a whole acquisition.
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldNow;

impl spin::relax::RelaxStrategy for YieldNow {
    fn relax() {
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_sleep_waits_at_least_requested() {
        let start = Instant::now();
        ThreadSleep.delay_us(2_000);
        assert!(start.elapsed() >= Duration::from_micros(2_000));
    }
}
