use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Top-level game configuration.
///
/// Only `scheduler` is consumed by the frame loop; the display fields are
/// passed through to whatever owns the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_true")]
    pub show_fps: bool,

    /// `env_logger` filter string, e.g. "info" or "shootemup_core=debug".
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub tick_source: TickSourceKind,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSourceKind {
    /// Deadline sleeps on the calling thread.
    #[default]
    Sleep,
    /// Periodic `crossbeam_channel::tick` receiver.
    Channel,
}

/// Frame timing constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// Upper bound on the measured delta fed into the accumulator (sec).
    #[serde(default = "default_max_frame_time_sec")]
    pub max_frame_time_sec: f64,

    #[serde(default = "default_perf_window_ms")]
    pub perf_window_ms: u64,

    /// Log the perf window summary each time it rolls over.
    #[serde(default = "default_true")]
    pub log_perf: bool,
}

fn default_title() -> String {
    "Shoot'em Up Game".to_string()
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_true() -> bool {
    true
}
fn default_target_fps() -> u32 {
    60
}
fn default_max_frame_time_sec() -> f64 {
    0.05
}
fn default_perf_window_ms() -> u64 {
    1000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            max_frame_time_sec: default_max_frame_time_sec(),
            perf_window_ms: default_perf_window_ms(),
            log_perf: true,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            show_fps: true,
            log_filter: None,
            tick_source: TickSourceKind::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl SchedulerConfig {
    /// Builds a validated config for `target_fps` with the default cap.
    pub fn with_fps(target_fps: u32) -> EngineResult<Self> {
        let cfg = Self {
            target_fps,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fixed simulation step, `1 / target_fps` seconds.
    #[inline]
    pub fn target_delta_time(&self) -> f64 {
        1.0 / self.target_fps as f64
    }

    /// Nominal tick period: `round(1000 / target_fps)` ms, at least 1 ms.
    pub fn tick_period(&self) -> Duration {
        let ms = (1000.0 / self.target_fps as f64).round() as u64;
        Duration::from_millis(ms.max(1))
    }

    #[inline]
    pub fn perf_window(&self) -> Duration {
        Duration::from_millis(self.perf_window_ms)
    }

    /// Upper bound on `update` calls a single tick can produce.
    pub fn max_updates_per_tick(&self) -> u32 {
        (self.max_frame_time_sec / self.target_delta_time()).floor() as u32 + 1
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.target_fps == 0 {
            return Err(EngineError::Config("target_fps must be positive".into()));
        }
        if !self.max_frame_time_sec.is_finite() || self.max_frame_time_sec < self.target_delta_time() {
            return Err(EngineError::Config(format!(
                "max_frame_time_sec {} is below the fixed step {:.6}",
                self.max_frame_time_sec,
                self.target_delta_time()
            )));
        }
        if self.perf_window_ms < 1000 {
            return Err(EngineError::Config(format!(
                "perf_window_ms {} is shorter than one second",
                self.perf_window_ms
            )));
        }
        Ok(())
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        let cfg: GameConfig =
            toml::from_str(s).map_err(|e| EngineError::Config(format!("parse: {}", e)))?;
        cfg.scheduler.validate()?;
        Ok(cfg)
    }

    /// Missing file means defaults; a malformed or invalid file is an error.
    pub fn load_or_default(path: &str) -> EngineResult<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| EngineError::Config(format!("{}: {}", path, e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(EngineError::Config(format!("{}: {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.width, 800);
        assert_eq!(cfg.height, 600);
        assert_eq!(cfg.scheduler.target_fps, 60);
        assert!((cfg.scheduler.target_delta_time() - 1.0 / 60.0).abs() < 1e-12);
        assert!(cfg.scheduler.validate().is_ok());
    }

    #[test]
    fn tick_period_is_rounded() {
        assert_eq!(SchedulerConfig::with_fps(60).unwrap().tick_period(), Duration::from_millis(17));
        assert_eq!(SchedulerConfig::with_fps(30).unwrap().tick_period(), Duration::from_millis(33));
        let fast = SchedulerConfig {
            target_fps: 5000,
            max_frame_time_sec: 0.05,
            ..SchedulerConfig::default()
        };
        assert_eq!(fast.tick_period(), Duration::from_millis(1));
    }

    #[test]
    fn update_bound_per_tick() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.max_updates_per_tick(), 4);
    }

    #[test]
    fn rejects_zero_fps() {
        assert!(matches!(SchedulerConfig::with_fps(0), Err(EngineError::Config(_))));
    }

    #[test]
    fn rejects_cap_below_fixed_step() {
        let cfg = SchedulerConfig {
            target_fps: 10,
            max_frame_time_sec: 0.05,
            ..SchedulerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = GameConfig::from_toml_str(
            r#"
            title = "test"
            tick_source = "channel"

            [scheduler]
            target_fps = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.title, "test");
        assert_eq!(cfg.width, 800);
        assert_eq!(cfg.tick_source, TickSourceKind::Channel);
        assert_eq!(cfg.scheduler.target_fps, 30);
        assert_eq!(cfg.scheduler.max_frame_time_sec, 0.05);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = GameConfig::from_toml_str("[scheduler]\ntarget_fps = 0\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn unreadable_file_is_config_error() {
        let dir = std::env::temp_dir().join(format!("shootemup-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let bad = dir.join("bad_utf8.toml");
        fs::write(&bad, b"[scheduler]\ntarget_fps = 30\n\xff\xfe").unwrap();
        let err = GameConfig::load_or_default(bad.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        // a directory is not a missing file either
        let err = GameConfig::load_or_default(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = GameConfig::load_or_default("/nonexistent/shootemup.toml").unwrap();
        assert_eq!(cfg.scheduler.target_fps, 60);
    }
}
