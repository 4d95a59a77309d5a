//! Host `log` backend for the simulator binary.
//!
//! Writes every record to stderr as
//!
//! ```text
//! INFO  [   1.234s] commandbot::scheduler - Scheduler: registered command 'SetDown'
//! ```
//!
//! The level filter comes from the `COMMANDBOT_LOG` environment variable
//! (`error`, `warn`, `info`, `debug`, `trace` or `off`), default `info`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Environment variable holding the level filter.
pub const LEVEL_ENV: &str = "COMMANDBOT_LOG";

pub struct ConsoleLogger {
    started: Instant,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f32();
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "{:<5} [{:>8.3}s] {} - {}",
            record.level(),
            elapsed,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Parse a level name; unknown or empty names fall back to `Info`.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the console logger with the level from [`LEVEL_ENV`].
///
/// Returns [`SetLoggerError`] if another logger is already installed.
pub fn init() -> Result<LevelFilter, SetLoggerError> {
    let level = parse_level(std::env::var(LEVEL_ENV).ok().as_deref());
    let logger = LOGGER.get_or_init(|| ConsoleLogger {
        started: Instant::now(),
    });
    log::set_logger(logger).map(|()| {
        log::set_max_level(level);
        level
    })
}
