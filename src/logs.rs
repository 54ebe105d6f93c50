//! Leveled console logging for pipeline narration.
//!
//! The transfer pipeline narrates what it is doing (files read, rows
//! matched, rows appended) through a small global logger so library code
//! never talks to stdout directly and the CLI can silence it with one call.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level for console display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Prints leveled log lines to stderr unless quieted.
pub struct Logger {
    quiet: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            quiet: AtomicBool::new(false),
        }
    }

    /// Silence Info/Success/Warning output. Errors always print.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.quiet.load(Ordering::Relaxed) && level != LogLevel::Error {
            return;
        }
        let prefix = match level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        eprintln!("{} {}", prefix, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl AsRef<str>) {
    LOGGER.log(LogLevel::Info, msg.as_ref());
}

pub fn log_success(msg: impl AsRef<str>) {
    LOGGER.log(LogLevel::Success, msg.as_ref());
}

pub fn log_warning(msg: impl AsRef<str>) {
    LOGGER.log(LogLevel::Warning, msg.as_ref());
}

pub fn log_error(msg: impl AsRef<str>) {
    LOGGER.log(LogLevel::Error, msg.as_ref());
}
