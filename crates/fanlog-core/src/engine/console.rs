//! Console sink, one of the two permanent built-ins.

use crate::level::LogLevel;

use super::{EngineCommon, LoggerEngine};

/// Writes rendered messages to the standard streams: `Error` and `Fatal`
/// go to stderr, everything else to stdout. Attached for the lifetime of
/// the logger and excluded from bulk clearing; not exportable.
pub struct ConsoleSink {
    common: EngineCommon,
}

pub const CONSOLE_SINK_NAME: &str = "Console";

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            common: EngineCommon::new(CONSOLE_SINK_NAME),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerEngine for ConsoleSink {
    fn common(&self) -> &EngineCommon {
        &self.common
    }

    fn emit(&self, level: LogLevel, rendered: &str) {
        match level {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", rendered),
            _ => println!("{}", rendered),
        }
    }
}
