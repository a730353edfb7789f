//! Verbosity ranks used for threshold filtering.
//!
//! The position of a level in the enumeration is its rank. A message is
//! delivered only when `rank(level) <= rank(threshold)`. `None` and
//! `AllLogLevels` are control values used for threshold configuration and
//! are never carried by real messages.

use crate::error::{LogError, LogResult};

/// Severity levels for log messages, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum LogLevel {
    /// Control value: no messages pass the threshold
    None = 0,
    /// Informational messages highlighting coarse-grained progress
    Info = 1,
    /// Potentially harmful situations
    Warning = 2,
    /// Error events that still allow the application to continue
    Error = 3,
    /// Severe errors that usually precede an abort
    Fatal = 4,
    /// Fine-grained events useful while debugging
    Debug = 5,
    /// Very fine-grained events
    Trace = 6,
    /// Control value: every message passes the threshold
    AllLogLevels = 7,
}

impl LogLevel {
    /// Returns true for the two control values that never appear on a
    /// real message (`None` and `AllLogLevels`).
    pub fn is_sentinel(self) -> bool {
        matches!(self, LogLevel::None | LogLevel::AllLogLevels)
    }

    /// Display name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::None => "None",
            LogLevel::Info => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
            LogLevel::AllLogLevels => "All Log Levels",
        }
    }

    /// Parse a display name back into a level.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "None" => Some(LogLevel::None),
            "Information" => Some(LogLevel::Info),
            "Warning" => Some(LogLevel::Warning),
            "Error" => Some(LogLevel::Error),
            "Fatal" => Some(LogLevel::Fatal),
            "Debug" => Some(LogLevel::Debug),
            "Trace" => Some(LogLevel::Trace),
            "All Log Levels" => Some(LogLevel::AllLogLevels),
            _ => None,
        }
    }

    /// Decode a rank stored in a session file.
    ///
    /// # Errors
    ///
    /// Returns `LogError::ConfigCorrupt` when the value is outside the
    /// known rank range.
    pub fn from_u32(value: u32) -> LogResult<Self> {
        Ok(match value {
            0 => LogLevel::None,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            3 => LogLevel::Error,
            4 => LogLevel::Fatal,
            5 => LogLevel::Debug,
            6 => LogLevel::Trace,
            7 => LogLevel::AllLogLevels,
            other => {
                return Err(LogError::ConfigCorrupt(format!(
                    "invalid log level value: {}",
                    other
                )))
            }
        })
    }

    /// All level display names, in rank order.
    ///
    /// When `include_debug_trace` is false the `Debug` and `Trace` names
    /// are omitted, matching a release-mode configuration where those
    /// levels are suppressed.
    pub fn level_strings(include_debug_trace: bool) -> Vec<&'static str> {
        let mut strings = vec!["None", "Information", "Warning", "Error", "Fatal"];
        if include_debug_trace {
            strings.push("Debug");
            strings.push("Trace");
        }
        strings.push("All Log Levels");
        strings
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
