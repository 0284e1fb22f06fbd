use std::sync::Once;

use log::Level;

/// Tagged front for the `log` facade. The tag becomes the record target, so
/// `RUST_LOG=Scheduler=debug` style filters work per subsystem.
#[derive(Clone)]
pub struct Logger {
    tag: &'static str,
}

impl Logger {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }

    #[inline]
    pub fn info(&self, msg: impl AsRef<str>) {
        self.emit(Level::Info, msg.as_ref());
    }

    #[inline]
    pub fn debug(&self, msg: impl AsRef<str>) {
        self.emit(Level::Debug, msg.as_ref());
    }

    #[inline]
    pub fn warn(&self, msg: impl AsRef<str>) {
        self.emit(Level::Warn, msg.as_ref());
    }

    #[inline]
    pub fn error(&self, msg: impl AsRef<str>) {
        self.emit(Level::Error, msg.as_ref());
    }

    #[inline]
    pub fn enabled(&self, lvl: Level) -> bool {
        log::log_enabled!(target: self.tag, lvl)
    }

    fn emit(&self, lvl: Level, msg: &str) {
        log::log!(target: self.tag, lvl, "{}", msg);
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` once per process.
///
/// Filter precedence: explicit `filter`, then `RUST_LOG`, then `info`.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.format_timestamp_millis();

        // A host that already installed a logger keeps it.
        let _ = builder.try_init();
    });
}
