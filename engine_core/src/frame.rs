use crate::time::FrameTime;

/// Contract between the frame loop and the game it drives.
///
/// Errors returned from `update` or `render` are logged by the scheduler and
/// the loop carries on; they never stop the cadence.
pub trait FrameTarget {
    /// Advance the simulation by exactly `dt` seconds. Called zero or more
    /// times per tick; must not block.
    fn update(&mut self, dt: f64) -> anyhow::Result<()>;

    /// Draw the current state. Called exactly once per tick, after the
    /// updates. Must not mutate simulation state.
    fn render(&mut self, frame: &FrameTime) -> anyhow::Result<()>;

    /// Polled at the top of every tick. Once false, the loop ends.
    fn is_running(&self) -> bool {
        true
    }
}

impl<T: FrameTarget + ?Sized> FrameTarget for Box<T> {
    fn update(&mut self, dt: f64) -> anyhow::Result<()> {
        (**self).update(dt)
    }

    fn render(&mut self, frame: &FrameTime) -> anyhow::Result<()> {
        (**self).render(frame)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}
