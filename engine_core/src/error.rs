use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Infrastructure faults. Consumer faults never end up here; the scheduler
/// logs them and keeps ticking.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("clock error: {0}")]
    Clock(String),

    #[error("tick source error: {0}")]
    TickSource(String),

    #[error("scheduler not started")]
    NotStarted,

    #[error("engine error: {0}")]
    Other(String),
}

impl From<ctrlc::Error> for EngineError {
    fn from(e: ctrlc::Error) -> Self {
        Self::Other(format!("ctrl-c handler: {e}"))
    }
}
