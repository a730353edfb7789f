//! Sink engine contract and built-in sinks.
//!
//! A logger engine is a pluggable destination for formatted output. Every
//! engine embeds an [`EngineCommon`] carrying its name, active flag, and
//! installed formatting strategy. Engines receive every broadcast message
//! regardless of the active flag; the flag is an output gate applied by the
//! engine itself, not a subscription gate.

pub mod console;
pub mod file;
pub mod native;

use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::LogResult;
use crate::format::FormattingEngine;
use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::session::ByteReader;

pub use console::{ConsoleSink, CONSOLE_SINK_NAME};
pub use file::{FileSink, FILE_SINK_TAG};
pub use native::{NativeDebugSink, NATIVE_SINK_NAME, NATIVE_TARGET};

struct EngineState {
    active: bool,
    formatter: Option<Arc<dyn FormattingEngine>>,
}

/// Shared state embedded in every sink engine.
pub struct EngineCommon {
    name: RwLock<String>,
    state: RwLock<EngineState>,
}

impl EngineCommon {
    /// Engines start inactive until explicitly enabled.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            state: RwLock::new(EngineState {
                active: false,
                formatter: None,
            }),
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    pub fn set_active(&self, active: bool) {
        self.state.write().active = active;
    }

    pub fn install_formatter(&self, formatter: Option<Arc<dyn FormattingEngine>>) {
        self.state.write().formatter = formatter;
    }

    pub fn formatter(&self) -> Option<Arc<dyn FormattingEngine>> {
        self.state.read().formatter.clone()
    }

    /// Name of the installed formatting strategy, empty when none is set.
    pub fn formatter_name(&self) -> String {
        self.state
            .read()
            .formatter
            .as_ref()
            .map(|f| f.name().to_string())
            .unwrap_or_default()
    }

    /// Render a message if the engine is active. Falls back to joining the
    /// parts when no formatting strategy is installed.
    pub fn render(&self, message: &LogMessage) -> Option<String> {
        let state = self.state.read();
        if !state.active {
            return None;
        }
        Some(match &state.formatter {
            Some(formatter) => formatter.format_message(message.level, &message.parts),
            None => message.parts.join(" "),
        })
    }
}

/// Export capability for engines that participate in session persistence.
///
/// The factory tag identifies the concrete type for reconstruction; the
/// binary payload is engine-specific and round-trips through
/// `export_binary`/`import_binary`.
pub trait ExportableEngine {
    /// Tag under which the concrete type is registered with the factory.
    fn factory_tag(&self) -> &str;

    /// Serialize engine-specific state.
    fn export_binary(&self, writer: &mut dyn Write) -> LogResult<()>;

    /// Restore engine-specific state from a session stream.
    fn import_binary(&self, reader: &mut ByteReader<'_>) -> LogResult<()>;
}

/// A pluggable destination for formatted log output.
pub trait LoggerEngine: Send + Sync {
    /// Shared engine state.
    fn common(&self) -> &EngineCommon;

    /// Prepare the engine for output. Engines that fail here are discarded
    /// by the attach protocol and never join the live set.
    fn initialize(&self) -> LogResult<()> {
        Ok(())
    }

    /// Perform the sink-specific output action with an already-rendered
    /// message. Only called for active engines.
    fn emit(&self, level: LogLevel, rendered: &str);

    /// Export capability, when the engine participates in persistence.
    fn exportable(&self) -> Option<&dyn ExportableEngine> {
        None
    }

    fn name(&self) -> String {
        self.common().name()
    }

    fn is_active(&self) -> bool {
        self.common().is_active()
    }

    fn set_active(&self, active: bool) {
        self.common().set_active(active);
    }

    fn install_formatting_engine(&self, formatter: Option<Arc<dyn FormattingEngine>>) {
        self.common().install_formatter(formatter);
    }

    fn formatting_engine_name(&self) -> String {
        self.common().formatter_name()
    }

    /// Broadcast entry point: gates on the active flag, renders, emits.
    fn handle_message(&self, message: &LogMessage) {
        if let Some(rendered) = self.common().render(message) {
            self.emit(message.level, &rendered);
        }
    }
}
