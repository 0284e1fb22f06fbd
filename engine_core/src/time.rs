use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crate::error::EngineResult;

/// Monotonic time source. Timestamps are offsets from an arbitrary origin
/// fixed at construction.
///
/// A failing read is an infrastructure fault and ends the loop.
pub trait Clock {
    fn now(&mut self) -> EngineResult<Duration>;
}

/// `Instant`-backed clock.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&mut self) -> EngineResult<Duration> {
        Ok(self.origin.elapsed())
    }
}

/// Hand-driven clock for deterministic replays and tests.
///
/// Clones share the same time, so one handle can stay with the driver while
/// the scheduler owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_add(by)));
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    pub fn set(&self, at: Duration) {
        self.nanos.store(saturating_nanos(at), Ordering::Release);
    }

    pub fn peek(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for ManualClock {
    #[inline]
    fn now(&mut self) -> EngineResult<Duration> {
        Ok(self.peek())
    }
}

/// Per-tick timing snapshot handed to the render hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Index of this tick, starting at 0.
    pub frame_index: u64,

    /// Fixed updates executed since start, this tick included.
    pub fixed_tick_index: u64,

    /// Measured delta after the cap (sec).
    pub dt_sec: f64,

    /// Fixed step (sec).
    pub fixed_dt_sec: f64,

    /// Updates executed this tick.
    pub fixed_steps: u32,

    /// `accumulator / fixed_dt`, in [0, 1).
    pub alpha: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let mut other = clock.clone();
        clock.advance(Duration::from_millis(16));
        clock.advance_secs(0.5);
        assert_eq!(other.now().unwrap(), Duration::from_millis(516));
        clock.set(Duration::from_secs(2));
        assert_eq!(other.now().unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn manual_clock_saturates_instead_of_wrapping() {
        let clock = ManualClock::new();
        clock.set(Duration::MAX);
        assert_eq!(clock.peek(), Duration::from_nanos(u64::MAX));

        clock.set(Duration::from_secs(1));
        clock.advance(Duration::MAX);
        assert_eq!(clock.peek(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn monotonic_clock_never_goes_back() {
        let mut clock = MonotonicClock::new();
        let a = clock.now().unwrap();
        let b = clock.now().unwrap();
        assert!(b >= a);
    }
}
