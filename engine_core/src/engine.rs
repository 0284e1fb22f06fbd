use crate::{
    config::SchedulerConfig,
    error::EngineResult,
    frame::FrameTarget,
    log::Logger,
    schedule::{FrameScheduler, TickOutcome},
    signals::RunFlag,
    ticker::TickSource,
    time::{Clock, MonotonicClock},
};

/// Totals for one `FrameLoop::run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub updates: u64,
    pub update_faults: u64,
    pub render_faults: u64,
    pub clamped_ticks: u64,
}

/// Drives a `FrameScheduler` from a `TickSource` until the run flag or the
/// target ends the loop.
pub struct FrameLoop<C: Clock = MonotonicClock> {
    scheduler: FrameScheduler<C>,
    log: Logger,
}

impl FrameLoop<MonotonicClock> {
    pub fn new(cfg: SchedulerConfig) -> EngineResult<Self> {
        Ok(Self::from_scheduler(FrameScheduler::new(cfg)?))
    }
}

impl<C: Clock> FrameLoop<C> {
    pub fn from_scheduler(scheduler: FrameScheduler<C>) -> Self {
        Self {
            scheduler,
            log: Logger::new("FrameLoop"),
        }
    }

    /// Starts the scheduler, registers `source` and ticks until stopped.
    ///
    /// Clock and tick-source failures end the run with an error; the source
    /// is unregistered on every exit path.
    pub fn run<S, T>(&mut self, source: &mut S, target: &mut T) -> EngineResult<RunSummary>
    where
        S: TickSource + ?Sized,
        T: FrameTarget + ?Sized,
    {
        self.scheduler.start()?;
        let period = self.scheduler.config().tick_period();
        source.register(period)?;
        self.log.info(format!("tick source registered, period {} ms", period.as_millis()));

        let result = self.pump(source, target);
        source.unregister();

        match &result {
            Ok(summary) => self.log.info(format!(
                "stopped after {} ticks, {} updates",
                summary.ticks, summary.updates
            )),
            Err(e) => {
                self.scheduler.stop();
                self.log.error(format!("aborted: {e}"));
            }
        }
        result
    }

    fn pump<S, T>(&mut self, source: &mut S, target: &mut T) -> EngineResult<RunSummary>
    where
        S: TickSource + ?Sized,
        T: FrameTarget + ?Sized,
    {
        let mut summary = RunSummary::default();
        loop {
            source.wait_tick()?;

            let report = match self.scheduler.on_tick(target)? {
                TickOutcome::Ticked(r) => r,
                TickOutcome::Stopped => return Ok(summary),
            };

            summary.ticks += 1;
            summary.updates += report.updates as u64;
            summary.update_faults += report.update_faults as u64;
            summary.render_faults += report.render_fault as u64;
            summary.clamped_ticks += report.clamped as u64;
        }
    }

    /// Cooperative stop; the loop exits at the next tick boundary.
    #[inline]
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    #[inline]
    pub fn run_flag(&self) -> RunFlag {
        self.scheduler.run_flag()
    }

    #[inline]
    pub fn scheduler(&self) -> &FrameScheduler<C> {
        &self.scheduler
    }
}
