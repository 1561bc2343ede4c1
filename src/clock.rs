//! Millisecond time source for the scan loop
//!
//! All duration comparisons against this clock must tolerate wraparound:
//! `now < earlier` means the counter wrapped, not that time went backwards.

use std::time::Instant;

/// Monotonic millisecond counter. May wrap.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock counting milliseconds since process start.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = clock.now_ms();
        assert!(second >= first + 5);
    }
}
