use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use crate::error::{EngineError, EngineResult};

/// Periodic, non-overlapping tick primitive.
///
/// Timing is best-effort. The scheduler measures real elapsed time on every
/// tick, so a late or early tick only changes how many fixed updates run.
pub trait TickSource {
    /// Arms the source with its nominal period. Failure is fatal.
    fn register(&mut self, period: Duration) -> EngineResult<()>;

    /// Blocks until the next tick is due.
    fn wait_tick(&mut self) -> EngineResult<()>;

    /// Disarms the source. Idempotent.
    fn unregister(&mut self);
}

/// Sleeps until the next deadline on the calling thread.
///
/// After an overrun of a full period or more the deadline is pushed out from
/// the current instant instead of firing a burst of catch-up ticks.
#[derive(Debug, Default)]
pub struct SleepTicker {
    period: Duration,
    next: Option<Instant>,
}

impl SleepTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for SleepTicker {
    fn register(&mut self, period: Duration) -> EngineResult<()> {
        if period.is_zero() {
            return Err(EngineError::TickSource("tick period must be non-zero".into()));
        }
        self.period = period;
        self.next = Some(Instant::now() + period);
        Ok(())
    }

    fn wait_tick(&mut self) -> EngineResult<()> {
        let Some(deadline) = self.next else {
            return Err(EngineError::TickSource("sleep ticker is not registered".into()));
        };

        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        let after = Instant::now();
        let mut next = deadline + self.period;
        if next <= after {
            next = after + self.period;
        }
        self.next = Some(next);
        Ok(())
    }

    fn unregister(&mut self) {
        self.next = None;
    }
}

/// Receives ticks from `crossbeam_channel::tick`, which runs its own timer.
/// Ticks that were missed while a frame ran are dropped by the channel rather
/// than queued.
#[derive(Debug, Default)]
pub struct ChannelTicker {
    rx: Option<Receiver<Instant>>,
}

impl ChannelTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ChannelTicker {
    fn register(&mut self, period: Duration) -> EngineResult<()> {
        if period.is_zero() {
            return Err(EngineError::TickSource("tick period must be non-zero".into()));
        }
        self.rx = Some(crossbeam_channel::tick(period));
        Ok(())
    }

    fn wait_tick(&mut self) -> EngineResult<()> {
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| EngineError::TickSource("channel ticker is not registered".into()))?;
        rx.recv()
            .map(|_| ())
            .map_err(|e| EngineError::TickSource(format!("tick channel closed: {e}")))
    }

    fn unregister(&mut self) {
        self.rx = None;
    }
}
