pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod log;
pub mod schedule;
pub mod shared;
pub mod signals;
pub mod telemetry;
pub mod ticker;
pub mod time;

pub use crate::config::{GameConfig, SchedulerConfig, TickSourceKind};
pub use crate::engine::{FrameLoop, RunSummary};
pub use crate::error::{EngineError, EngineResult};
pub use crate::frame::FrameTarget;
pub use crate::schedule::{FrameScheduler, TickOutcome, TickReport};
pub use crate::shared::SharedScheduler;
pub use crate::signals::RunFlag;
pub use crate::ticker::{ChannelTicker, SleepTicker, TickSource};
pub use crate::time::{Clock, FrameTime, ManualClock, MonotonicClock};
