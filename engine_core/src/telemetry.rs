use std::time::Duration;

use crate::log::Logger;

/// Rolled-over perf window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfSnapshot {
    /// Ticks rendered during the window.
    pub frames: u32,
    /// Fixed updates executed during the window.
    pub updates: u32,
    /// Actual window length, always >= the configured window.
    pub elapsed: Duration,
}

/// Rolling frame counter. Pure side channel: nothing it does feeds back into
/// scheduling.
pub struct PerfMonitor {
    log: Logger,

    window: Duration,
    log_enabled: bool,
    target_fps: u32,

    window_start: Duration,
    frame_counter: u32,
    update_counter: u32,

    last_fps: u32,
    last_updates: u32,
}

impl PerfMonitor {
    pub fn new(window: Duration, target_fps: u32, log_enabled: bool) -> Self {
        Self {
            log: Logger::new("Perf"),
            window,
            log_enabled,
            target_fps,
            window_start: Duration::ZERO,
            frame_counter: 0,
            update_counter: 0,
            last_fps: 0,
            last_updates: 0,
        }
    }

    /// Starts a fresh window at `now`.
    pub fn reset(&mut self, now: Duration) {
        self.window_start = now;
        self.frame_counter = 0;
        self.update_counter = 0;
    }

    /// Counts one rendered tick that ran `updates` fixed steps. Returns the
    /// finished window when `now` closes one.
    pub fn record_frame(&mut self, now: Duration, updates: u32) -> Option<PerfSnapshot> {
        self.frame_counter += 1;
        self.update_counter += updates;

        let elapsed = now.saturating_sub(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let snap = PerfSnapshot {
            frames: self.frame_counter,
            updates: self.update_counter,
            elapsed,
        };

        self.last_fps = self.frame_counter;
        self.last_updates = self.update_counter;
        self.frame_counter = 0;
        self.update_counter = 0;
        self.window_start = now;

        if self.log_enabled {
            self.log.info(format!(
                "frames rendered {} updates {} target fps {}",
                snap.frames, snap.updates, self.target_fps
            ));
        }

        Some(snap)
    }

    /// Frames counted in the last finished window; 0 until one finishes.
    #[inline]
    pub fn last_fps(&self) -> u32 {
        self.last_fps
    }

    #[inline]
    pub fn last_updates_per_window(&self) -> u32 {
        self.last_updates
    }

    #[inline]
    pub fn frames_in_window(&self) -> u32 {
        self.frame_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn no_snapshot_before_window_elapses() {
        let mut perf = PerfMonitor::new(ms(1000), 60, false);
        perf.reset(ms(0));
        for i in 1..=59 {
            assert!(perf.record_frame(ms(i * 16), 1).is_none());
        }
        assert_eq!(perf.last_fps(), 0);
        assert_eq!(perf.frames_in_window(), 59);
    }

    #[test]
    fn window_rolls_over_at_one_second() {
        let mut perf = PerfMonitor::new(ms(1000), 60, false);
        perf.reset(ms(0));
        for i in 1..60 {
            perf.record_frame(ms(i * 16), 2);
        }
        let snap = perf.record_frame(ms(1000), 0).expect("window should close");
        assert_eq!(snap.frames, 60);
        assert_eq!(snap.updates, 118);
        assert_eq!(snap.elapsed, ms(1000));
        assert_eq!(perf.last_fps(), 60);
        assert_eq!(perf.last_updates_per_window(), 118);
        assert_eq!(perf.frames_in_window(), 0);

        // next window is measured from the rollover point
        assert!(perf.record_frame(ms(1999), 1).is_none());
        assert!(perf.record_frame(ms(2000), 1).is_some());
        assert_eq!(perf.last_fps(), 2);
    }

    #[test]
    fn late_tick_closes_window_once() {
        let mut perf = PerfMonitor::new(ms(1000), 60, false);
        perf.reset(ms(0));
        let snap = perf.record_frame(ms(3500), 3).unwrap();
        assert_eq!(snap.frames, 1);
        assert_eq!(snap.elapsed, ms(3500));
        assert!(perf.record_frame(ms(3600), 1).is_none());
    }
}
