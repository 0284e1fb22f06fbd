use std::time::Duration;

use crate::{
    config::SchedulerConfig,
    error::{EngineError, EngineResult},
    frame::FrameTarget,
    log::Logger,
    signals::RunFlag,
    telemetry::PerfMonitor,
    time::{Clock, FrameTime, MonotonicClock},
};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Measured delta before the cap (sec).
    pub raw_dt_sec: f64,
    /// Delta actually fed into the accumulator (sec).
    pub dt_sec: f64,
    /// The cap discarded part of this tick's delta.
    pub clamped: bool,
    pub updates: u32,
    pub update_faults: u32,
    pub render_fault: bool,
    pub frame: FrameTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Ticked(TickReport),
    /// The run flag or the target said stop. Nothing was called; the tick
    /// source should be released.
    Stopped,
}

#[derive(Debug, Clone, Copy)]
struct SchedulerState {
    last_tick: Duration,
    accumulator: f64,
}

/// Fixed-timestep frame scheduler.
///
/// Turns irregular ticks into a steady sequence of `update(fixed_dt)` calls
/// plus exactly one `render` per tick. The measured delta is capped at
/// `max_frame_time_sec` before it reaches the accumulator, which bounds the
/// catch-up work of a late tick (anti spiral-of-death) at the cost of
/// simulated time running slow during long stalls.
///
/// Ticks must be serialised; see `SharedScheduler` for multi-threaded hosts.
pub struct FrameScheduler<C: Clock = MonotonicClock> {
    cfg: SchedulerConfig,
    fixed_dt: f64,
    max_dt: f64,

    clock: C,
    running: RunFlag,
    state: Option<SchedulerState>,

    perf: PerfMonitor,
    log: Logger,

    frame_index: u64,
    fixed_tick_index: u64,
    clamped_time: f64,
    consecutive_faults: u32,
}

impl FrameScheduler<MonotonicClock> {
    pub fn new(cfg: SchedulerConfig) -> EngineResult<Self> {
        Self::with_clock(cfg, MonotonicClock::new())
    }
}

impl<C: Clock> FrameScheduler<C> {
    pub fn with_clock(cfg: SchedulerConfig, clock: C) -> EngineResult<Self> {
        cfg.validate()?;

        let perf = PerfMonitor::new(cfg.perf_window(), cfg.target_fps, cfg.log_perf);

        Ok(Self {
            fixed_dt: cfg.target_delta_time(),
            max_dt: cfg.max_frame_time_sec,
            cfg,
            clock,
            running: RunFlag::new(),
            state: None,
            perf,
            log: Logger::new("Scheduler"),
            frame_index: 0,
            fixed_tick_index: 0,
            clamped_time: 0.0,
            consecutive_faults: 0,
        })
    }

    /// Seeds the tick baseline from the clock and raises the run flag.
    ///
    /// A stop requested before this call is honoured: the flag stays down and
    /// the first tick reports `Stopped`. To run again after a stop, call
    /// `RunFlag::reset` first. Timing restarts from scratch; counters are kept.
    pub fn start(&mut self) -> EngineResult<()> {
        let now = self.clock.now()?;

        self.state = Some(SchedulerState {
            last_tick: now,
            accumulator: 0.0,
        });
        self.perf.reset(now);
        self.consecutive_faults = 0;
        if !self.running.raise() {
            self.log.info("stop requested before start");
            return Ok(());
        }

        self.log.info(format!(
            "started: target fps {} fixed dt {:.6}s cap {:.3}s",
            self.cfg.target_fps, self.fixed_dt, self.max_dt
        ));
        Ok(())
    }

    /// Runs one frame against `target`.
    ///
    /// Consumer errors are logged and counted in the report. Only clock
    /// failures and ticking before `start` are returned as errors.
    pub fn on_tick<T: FrameTarget + ?Sized>(&mut self, target: &mut T) -> EngineResult<TickOutcome> {
        let Some(state) = self.state.as_mut() else {
            return Err(EngineError::NotStarted);
        };

        if !self.running.is_running() || !target.is_running() {
            self.running.stop();
            return Ok(TickOutcome::Stopped);
        }

        let now = self.clock.now()?;
        let raw = match now.checked_sub(state.last_tick) {
            Some(d) => d,
            None => {
                self.log.warn("clock went backwards, treating delta as zero");
                Duration::ZERO
            }
        };
        state.last_tick = now;

        let raw_dt = raw.as_secs_f64();
        let dt = raw_dt.min(self.max_dt);
        let clamped = raw_dt > self.max_dt;
        if clamped {
            self.clamped_time += raw_dt - dt;
            self.log.debug(format!("late tick: {:.3}s capped to {:.3}s", raw_dt, dt));
        }

        state.accumulator += dt;

        let mut updates = 0u32;
        let mut update_faults = 0u32;
        while state.accumulator >= self.fixed_dt {
            self.fixed_tick_index += 1;
            if let Err(e) = target.update(self.fixed_dt) {
                update_faults += 1;
                self.log.error(format!(
                    "during update (fixed tick {}): {:#}",
                    self.fixed_tick_index, e
                ));
            }
            state.accumulator -= self.fixed_dt;
            updates += 1;
        }

        let frame = FrameTime {
            frame_index: self.frame_index,
            fixed_tick_index: self.fixed_tick_index,
            dt_sec: dt,
            fixed_dt_sec: self.fixed_dt,
            fixed_steps: updates,
            alpha: (state.accumulator / self.fixed_dt).clamp(0.0, 0.999_999),
        };

        let render_fault = match target.render(&frame) {
            Ok(()) => false,
            Err(e) => {
                self.log.error(format!("during render (frame {}): {:#}", frame.frame_index, e));
                true
            }
        };

        if update_faults > 0 || render_fault {
            self.consecutive_faults += 1;
            if self.consecutive_faults % self.cfg.target_fps == 0 {
                self.log.warn(format!(
                    "target has faulted on {} consecutive ticks",
                    self.consecutive_faults
                ));
            }
        } else {
            self.consecutive_faults = 0;
        }

        self.perf.record_frame(now, updates);
        self.frame_index += 1;

        Ok(TickOutcome::Ticked(TickReport {
            raw_dt_sec: raw_dt,
            dt_sec: dt,
            clamped,
            updates,
            update_faults,
            render_fault,
            frame,
        }))
    }

    /// Clears the run flag. The tick in flight, if any, completes; the next
    /// one reports `Stopped`.
    #[inline]
    pub fn stop(&self) {
        self.running.stop();
    }

    /// Handle for stopping the loop from elsewhere (another thread, Ctrl+C).
    #[inline]
    pub fn run_flag(&self) -> RunFlag {
        self.running.clone()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Unsimulated time carried to the next tick (sec). 0 before `start`.
    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.state.map(|s| s.accumulator).unwrap_or(0.0)
    }

    #[inline]
    pub fn target_delta_time(&self) -> f64 {
        self.fixed_dt
    }

    /// `accumulator / target_delta_time`, for blending between the last two
    /// simulated states.
    #[inline]
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator() / self.fixed_dt
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn fixed_tick_index(&self) -> u64 {
        self.fixed_tick_index
    }

    /// Total simulated time (sec).
    #[inline]
    pub fn simulated_time(&self) -> f64 {
        self.fixed_tick_index as f64 * self.fixed_dt
    }

    /// Wall time dropped by the cap since construction (sec).
    #[inline]
    pub fn clamped_time(&self) -> f64 {
        self.clamped_time
    }

    #[inline]
    pub fn consecutive_faults(&self) -> u32 {
        self.consecutive_faults
    }

    #[inline]
    pub fn last_fps(&self) -> u32 {
        self.perf.last_fps()
    }

    #[inline]
    pub fn perf(&self) -> &PerfMonitor {
        &self.perf
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }
}
