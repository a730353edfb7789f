//! Native debug channel sink, one of the two permanent built-ins.
//!
//! Forwards rendered output to the process-wide `tracing` dispatcher, the
//! Rust-native debug/trace channel. The events carry the
//! `fanlog::native` target so the handler bridge can recognize and skip
//! them, preventing feedback loops when the bridge is installed.

use crate::level::LogLevel;

use super::{EngineCommon, LoggerEngine};

pub const NATIVE_SINK_NAME: &str = "Native Debug";

/// Target attached to all events emitted by this sink.
pub const NATIVE_TARGET: &str = "fanlog::native";

pub struct NativeDebugSink {
    common: EngineCommon,
}

impl NativeDebugSink {
    pub fn new() -> Self {
        Self {
            common: EngineCommon::new(NATIVE_SINK_NAME),
        }
    }
}

impl Default for NativeDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerEngine for NativeDebugSink {
    fn common(&self) -> &EngineCommon {
        &self.common
    }

    fn emit(&self, level: LogLevel, rendered: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: NATIVE_TARGET, "{}", rendered),
            LogLevel::Warning => tracing::warn!(target: NATIVE_TARGET, "{}", rendered),
            LogLevel::Error | LogLevel::Fatal => {
                tracing::error!(target: NATIVE_TARGET, "{}", rendered)
            }
            LogLevel::Debug => tracing::debug!(target: NATIVE_TARGET, "{}", rendered),
            LogLevel::Trace => tracing::trace!(target: NATIVE_TARGET, "{}", rendered),
            // Sentinels are rejected upstream; nothing to forward.
            LogLevel::None | LogLevel::AllLogLevels => {}
        }
    }
}
