use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use crate::error::EngineResult;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Cooperative run flag shared between the scheduler and whoever controls its
/// lifecycle. Stopping never interrupts a tick; the scheduler observes it at
/// the next tick boundary.
///
/// A stop requested before the scheduler starts is kept: `start` only moves
/// an idle flag to running.
#[derive(Clone, Debug)]
pub struct RunFlag {
    state: Arc<AtomicU8>,
}

impl RunFlag {
    /// Starts idle; `FrameScheduler::start` raises it.
    pub fn new() -> Self {
        Self { state: Arc::new(AtomicU8::new(IDLE)) }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOPPED
    }

    /// Idle -> running. Returns whether the flag is running afterwards.
    #[inline]
    pub(crate) fn raise(&self) -> bool {
        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(cur) => cur == RUNNING,
        }
    }

    #[inline]
    pub fn stop(&self) {
        self.state.store(STOPPED, Ordering::Release);
    }

    /// Forgets a previous stop so the scheduler can be started again.
    #[inline]
    pub fn reset(&self) {
        self.state.store(IDLE, Ordering::Release);
    }

    /// Ctrl+C stops the flag instead of killing the process. A press that
    /// lands before the loop starts still counts.
    ///
    /// `ctrlc` allows one handler per process; a second call fails.
    pub fn install_ctrlc(&self) -> EngineResult<()> {
        let state = self.state.clone();
        ctrlc::set_handler(move || {
            state.store(STOPPED, Ordering::Release);
        })?;
        Ok(())
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = RunFlag::new();
        let b = a.clone();
        assert!(!b.is_running());
        assert!(a.raise());
        assert!(b.is_running());
        b.stop();
        assert!(!a.is_running());
        assert!(a.is_stop_requested());
    }

    #[test]
    fn stop_before_raise_sticks() {
        let flag = RunFlag::new();
        flag.stop();
        assert!(!flag.raise());
        assert!(!flag.is_running());

        flag.reset();
        assert!(flag.raise());
        assert!(flag.is_running());
    }

    #[test]
    fn stop_is_visible_across_threads() {
        let flag = RunFlag::new();
        flag.raise();
        let remote = flag.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(!flag.is_running());
    }
}
