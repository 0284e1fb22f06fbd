use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::EngineResult,
    frame::FrameTarget,
    schedule::{FrameScheduler, TickOutcome},
    signals::RunFlag,
    time::{Clock, MonotonicClock},
};

struct Bound<T, C: Clock> {
    scheduler: FrameScheduler<C>,
    target: T,
}

/// Scheduler and target behind one lock, for hosts whose ticks may arrive on
/// different threads. The lock covers the whole tick, so ticks never overlap.
pub struct SharedScheduler<T, C: Clock = MonotonicClock> {
    inner: Arc<Mutex<Bound<T, C>>>,
    run_flag: RunFlag,
}

impl<T, C: Clock> Clone for SharedScheduler<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            run_flag: self.run_flag.clone(),
        }
    }
}

impl<T: FrameTarget, C: Clock> SharedScheduler<T, C> {
    pub fn new(scheduler: FrameScheduler<C>, target: T) -> Self {
        let run_flag = scheduler.run_flag();
        Self {
            inner: Arc::new(Mutex::new(Bound { scheduler, target })),
            run_flag,
        }
    }

    pub fn start(&self) -> EngineResult<()> {
        self.inner.lock().scheduler.start()
    }

    pub fn tick(&self) -> EngineResult<TickOutcome> {
        let mut guard = self.inner.lock();
        let Bound { scheduler, target } = &mut *guard;
        scheduler.on_tick(target)
    }

    /// Does not wait for the lock; an in-flight tick finishes normally.
    pub fn stop(&self) {
        self.run_flag.stop();
    }

    pub fn is_running(&self) -> bool {
        self.run_flag.is_running()
    }

    /// Read access to both halves between ticks.
    pub fn inspect<R>(&self, f: impl FnOnce(&FrameScheduler<C>, &T) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard.scheduler, &guard.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SchedulerConfig, time::FrameTime, time::ManualClock};
    use std::time::Duration;

    #[derive(Default)]
    struct Counter {
        updates: u64,
        renders: u64,
        in_tick: bool,
        overlaps: u32,
    }

    impl FrameTarget for Counter {
        fn update(&mut self, _dt: f64) -> anyhow::Result<()> {
            self.updates += 1;
            Ok(())
        }

        fn render(&mut self, _frame: &FrameTime) -> anyhow::Result<()> {
            if self.in_tick {
                self.overlaps += 1;
            }
            self.in_tick = true;
            std::thread::yield_now();
            self.renders += 1;
            self.in_tick = false;
            Ok(())
        }
    }

    #[test]
    fn ticks_from_many_threads_are_serialised() {
        let clock = ManualClock::new();
        let mut cfg = SchedulerConfig::default();
        cfg.log_perf = false;
        let sched = FrameScheduler::with_clock(cfg, clock.clone()).unwrap();
        let shared = SharedScheduler::new(sched, Counter::default());
        shared.start().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        shared.tick().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        shared.inspect(|s, t| {
            assert_eq!(t.renders, 200);
            assert_eq!(t.overlaps, 0);
            assert_eq!(s.frame_index(), 200);
        });

        // a frozen clock never produces updates
        assert_eq!(clock.peek(), Duration::ZERO);
        shared.inspect(|_, t| assert_eq!(t.updates, 0));
    }

    #[test]
    fn stop_from_another_handle() {
        let mut cfg = SchedulerConfig::default();
        cfg.log_perf = false;
        let sched = FrameScheduler::with_clock(cfg, ManualClock::new()).unwrap();
        let shared = SharedScheduler::new(sched, Counter::default());
        shared.start().unwrap();
        assert!(shared.is_running());

        let remote = shared.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();

        assert_eq!(shared.tick().unwrap(), TickOutcome::Stopped);
        shared.inspect(|_, t| assert_eq!(t.renders, 0));
    }
}
