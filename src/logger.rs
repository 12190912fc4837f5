//! Stderr logging, colored when stderr is a terminal. Stdout is reserved for the smoke-test transcript.

use std::io::{IsTerminal, stderr};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339_seconds;
use log::{Level, LevelFilter, debug, warn};

use crate::error::SmokeError;

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Maps the number of `-v` flags to a level filter.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger. Later calls log a warning and return `Ok`.
///
/// # Errors
///
/// Returns [`SmokeError::Logger`] if another logger was installed outside this function.
pub fn initialize(level: LevelFilter) -> Result<(), SmokeError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(level);
        if result.is_ok() {
            debug!("Logger initialized with level: {level:?}");
        }
    });

    result
}

/// Level label for a log line. ANSI colors only when `colored` is set.
pub fn level_label(level: Level, colored: bool) -> String {
    if !colored {
        return level.to_string();
    }
    ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta)
        .color(level)
        .to_string()
}

fn initialize_internal(level: LevelFilter) -> Result<(), SmokeError> {
    // redirected stderr gets plain labels
    let colored = stderr().is_terminal();

    Dispatch::new()
        .level(level)
        // reqwest's connection pool is chatty at debug
        .level_for("hyper_util", LevelFilter::Warn)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339_seconds(SystemTime::now()),
                level = level_label(record.level(), colored),
                message = message,
                target = record.target(),
            ))
        })
        .chain(stderr())
        .apply()
        .map_err(|e| SmokeError::Logger(e.to_string()))
}
