//! A small hand-rolled logging facility, in the style the teacher uses
//! throughout (`crate::log::LogLevel::LogDebug` + `log!(...)`) rather than
//! pulling in the `log` crate. The surrounding tracer owns the real sink
//! (see spec.md §1, "logging setup" is an external collaborator); this
//! module only pins the interface the unwind subsystem calls into.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};

#[repr(usize)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum LogLevel {
    LogFatal = 0,
    LogWarn = 1,
    LogInfo = 2,
    LogDebug = 3,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::LogFatal => "FATAL",
            LogLevel::LogWarn => "WARN",
            LogLevel::LogInfo => "INFO",
            LogLevel::LogDebug => "DEBUG",
        }
    }

    fn from_env_str(s: &str) -> Option<LogLevel> {
        match s {
            "fatal" => Some(LogLevel::LogFatal),
            "warn" => Some(LogLevel::LogWarn),
            "info" => Some(LogLevel::LogInfo),
            "debug" => Some(LogLevel::LogDebug),
            _ => None,
        }
    }
}

static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LogLevel::LogWarn as usize);

/// Reads `STRACEBACK_LOG` once at first use. Mirrors the teacher's
/// env-var-driven overrides in `flags.rs` (`forced_uarch`, `resource_path`).
pub fn init_from_env() {
    if let Ok(val) = env::var("STRACEBACK_LOG") {
        if let Some(level) = LogLevel::from_env_str(val.trim()) {
            CURRENT_LEVEL.store(level as usize, Ordering::Relaxed);
        }
    }
}

pub fn set_level(level: LogLevel) {
    CURRENT_LEVEL.store(level as usize, Ordering::Relaxed);
}

pub fn enabled(level: LogLevel) -> bool {
    (level as usize) <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn emit(level: LogLevel, module: &str, args: std::fmt::Arguments) {
    if enabled(level) {
        eprintln!("[{}:{}] {}", level.as_str(), module, args);
    }
}

#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::log::emit($level, module_path!(), format_args!($($arg)+))
    };
}
