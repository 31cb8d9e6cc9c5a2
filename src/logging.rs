//! Leveled diagnostic logging.
//!
//! RPC code never reaches for a global logger. Anything that wants to log
//! is handed a [`Log`] capability, and checks [`Log::is_logging`] before
//! formatting (the [`log_at!`](crate::logging::log_at) macro does both).
//!
//! [`Logger`] is the stock implementation: a per-module level table that
//! forwards enabled messages to `tracing`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity levels, least verbose first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Silent = 0,
    Error = 1,
    Warning = 2,
    Notice = 3,
    Debug = 4,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Silent,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Notice,
        LogLevel::Debug,
    ];

    /// Clamp an integer into the valid level range.
    pub fn from_int(level: i32) -> Self {
        let clamped = level.clamp(0, LogLevel::Debug as i32);
        Self::ALL[clamped as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "SILENT",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown log level: {}", s))
    }
}

/// Subsystems with independently configurable levels.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogModule {
    /// RPC invocation and retry.
    Rpc = 0,
    /// Session connections and framing.
    Transport = 1,
}

const NUM_LOG_MODULES: usize = 2;

impl LogModule {
    pub const ALL: [LogModule; NUM_LOG_MODULES] = [LogModule::Rpc, LogModule::Transport];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogModule::Rpc => "rpc",
            LogModule::Transport => "transport",
        }
    }
}

/// A level-gated log sink.
pub trait Log: Send + Sync {
    /// Whether messages at `level` for `module` would be emitted.
    fn is_logging(&self, module: LogModule, level: LogLevel) -> bool;

    /// Emit a message. Implementations may assume the caller checked
    /// [`is_logging`](Log::is_logging) first.
    fn log(&self, module: LogModule, level: LogLevel, args: fmt::Arguments<'_>);
}

/// Log a formatted message through a [`Log`], formatting only if enabled.
///
/// `$logger` must be a reference or smart pointer to a `Log`.
macro_rules! log_at {
    ($logger:expr, $module:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &*$logger;
        if $crate::logging::Log::is_logging(logger, $module, $level) {
            $crate::logging::Log::log(logger, $module, $level, format_args!($($arg)+));
        }
    }};
}

pub(crate) use log_at;

/// Per-module level table forwarding to `tracing`.
///
/// Levels are atomics, so a shared `Logger` can be retuned while in use.
#[derive(Debug)]
pub struct Logger {
    levels: [AtomicU8; NUM_LOG_MODULES],
}

impl Logger {
    /// All modules start at `level`.
    pub fn new(level: LogLevel) -> Self {
        Self {
            levels: std::array::from_fn(|_| AtomicU8::new(level as u8)),
        }
    }

    /// Current level for `module`.
    pub fn log_level(&self, module: LogModule) -> LogLevel {
        LogLevel::from_int(self.levels[module as usize].load(Ordering::Relaxed) as i32)
    }

    pub fn set_log_level(&self, module: LogModule, level: LogLevel) {
        self.levels[module as usize].store(level as u8, Ordering::Relaxed);
    }

    /// Shift one module's level by `delta`, clamped to the valid range.
    pub fn change_log_level(&self, module: LogModule, delta: i32) {
        let current = self.log_level(module) as i32;
        self.set_log_level(module, LogLevel::from_int(current.saturating_add(delta)));
    }

    pub fn set_log_levels(&self, level: LogLevel) {
        for slot in &self.levels {
            slot.store(level as u8, Ordering::Relaxed);
        }
    }

    pub fn change_log_levels(&self, delta: i32) {
        for module in LogModule::ALL {
            self.change_log_level(module, delta);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Notice)
    }
}

impl Log for Logger {
    fn is_logging(&self, module: LogModule, level: LogLevel) -> bool {
        level != LogLevel::Silent && level <= self.log_level(module)
    }

    fn log(&self, module: LogModule, level: LogLevel, args: fmt::Arguments<'_>) {
        let module = module.as_str();
        match level {
            LogLevel::Silent => {}
            LogLevel::Error => tracing::error!(module, "{}", args),
            LogLevel::Warning => tracing::warn!(module, "{}", args),
            LogLevel::Notice => tracing::info!(module, "{}", args),
            LogLevel::Debug => tracing::debug!(module, "{}", args),
        }
    }
}
