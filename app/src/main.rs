mod game;

use anyhow::Context;
use shootemup_core::{
    log::init_logging, ChannelTicker, FrameLoop, GameConfig, SleepTicker, TickSource, TickSourceKind,
};

use crate::game::Game;

fn main() -> anyhow::Result<()> {
    let path = std::env::var("SHOOTEMUP_CONFIG").unwrap_or_else(|_| "shootemup.toml".to_string());
    let cfg = GameConfig::load_or_default(&path)?;

    init_logging(cfg.log_filter.as_deref());
    log::info!(
        "{} {}x{} target fps {}",
        cfg.title,
        cfg.width,
        cfg.height,
        cfg.scheduler.target_fps
    );

    let quit_after_sec = match std::env::var("SHOOTEMUP_QUIT_AFTER_SEC") {
        Ok(v) => Some(
            v.parse::<f64>()
                .with_context(|| format!("SHOOTEMUP_QUIT_AFTER_SEC={v}"))?,
        ),
        Err(_) => None,
    };

    let mut game = Game::new(&cfg, quit_after_sec);
    game.load_resources();

    let mut frame_loop = FrameLoop::new(cfg.scheduler.clone())?;
    // Installed before `run` on purpose: a press that lands before the first
    // tick leaves the flag stopped and the loop exits without ticking.
    if let Err(e) = frame_loop.run_flag().install_ctrlc() {
        log::warn!("ctrl-c handler not installed: {e}");
    }

    let mut source: Box<dyn TickSource> = match cfg.tick_source {
        TickSourceKind::Sleep => Box::new(SleepTicker::new()),
        TickSourceKind::Channel => Box::new(ChannelTicker::new()),
    };

    let summary = frame_loop.run(source.as_mut(), &mut game)?;

    log::info!(
        "game stopped: {} frames, {} updates applied, {:.2}s simulated, {} faults",
        summary.ticks,
        game.updates(),
        game.sim_time(),
        summary.update_faults + summary.render_faults
    );
    if let Some(frame) = game.last_frame() {
        log::info!(
            "last frame {} fixed tick {} alpha {:.2}",
            frame.frame_index,
            frame.fixed_tick_index,
            frame.alpha
        );
    }
    Ok(())
}
