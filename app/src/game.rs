use shootemup_core::{log::Logger, FrameTarget, FrameTime, GameConfig};

/// Placeholder game: advances a clock and reports what it would draw.
/// Entities, input and the window live elsewhere.
pub struct Game {
    log: Logger,
    title: String,
    show_fps: bool,

    sim_time: f64,
    updates: u64,
    last_frame: Option<FrameTime>,

    /// Headless runs quit once this much simulated time has passed.
    quit_after_sec: Option<f64>,
    running: bool,
}

impl Game {
    pub fn new(cfg: &GameConfig, quit_after_sec: Option<f64>) -> Self {
        Self {
            log: Logger::new("Game"),
            title: cfg.title.clone(),
            show_fps: cfg.show_fps,
            sim_time: 0.0,
            updates: 0,
            last_frame: None,
            quit_after_sec,
            running: true,
        }
    }

    pub fn load_resources(&mut self) {
        // textures, sounds and level data are not wired up yet
        self.log.info(format!("{}: resources loaded", self.title));
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Snapshot from the most recent render, if any frame was drawn.
    pub fn last_frame(&self) -> Option<&FrameTime> {
        self.last_frame.as_ref()
    }
}

impl FrameTarget for Game {
    fn update(&mut self, dt: f64) -> anyhow::Result<()> {
        self.sim_time += dt;
        self.updates += 1;

        if let Some(limit) = self.quit_after_sec {
            if self.sim_time >= limit {
                self.running = false;
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &FrameTime) -> anyhow::Result<()> {
        self.last_frame = Some(*frame);

        if self.show_fps && self.log.enabled(log::Level::Trace) {
            log::trace!(
                target: "Game",
                "frame {} sim {:.3}s alpha {:.2}",
                frame.frame_index,
                self.sim_time,
                frame.alpha
            );
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
