//! Logger Core - the message router coordinating sinks, formatting, and
//! session persistence.
//!
//! The logger is an explicit service object created by the process entry
//! point and injected into callers; [`Logger::global`] offers a lazily
//! created process-wide instance for applications that want one. All
//! shared state (the live engine set, the global threshold, the priority
//! formatting slot) lives behind a single reader/writer lock so dispatch,
//! attach/detach, and session load can never observe a torn collection.
//!
//! # Example
//!
//! ```ignore
//! use fanlog_core::{Logger, LoggerConfig, LogLevel};
//!
//! let logger = std::sync::Arc::new(Logger::new(LoggerConfig::default()));
//! logger.initialize()?;
//! logger.set_global_level(LogLevel::Debug);
//! logger.toggle_console_engine(true);
//!
//! logger.submit("All", LogLevel::Info, vec!["engine started".to_string()]);
//! logger.finalize();
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::engine::{ConsoleSink, FileSink, LoggerEngine, NativeDebugSink, FILE_SINK_TAG};
use crate::error::{LogError, LogResult};
use crate::factory::{EngineConstructor, EngineFactory};
use crate::format::{
    DefaultFormatter, FormattingEngine, FormattingRegistry, HtmlFormatter, NativeFormatter,
    RichTextFormatter, XmlFormatter, FORMATTER_DEFAULT, FORMATTER_NATIVE,
};
use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::session;
use crate::settings::{keys, MemorySettings, SettingsStore};

/// Capacity of the two notification broadcast channels
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default session-config file name, relative to the working directory
pub const DEFAULT_SESSION_FILE: &str = "fanlog-session.logcfg";

/// Change kind carried by an [`EngineEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineChange {
    Added,
    Removed,
}

/// Emitted on the engine-event channel whenever the live set changes
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub name: String,
    pub change: EngineChange,
}

/// A single rendered string emitted on the priority channel, separate
/// from the bulk sink broadcast
#[derive(Debug, Clone)]
pub struct PriorityMessage {
    pub level: LogLevel,
    pub rendered: String,
}

/// Construction parameters for a [`Logger`]
pub struct LoggerConfig {
    /// Store for level/handler preferences remembered across runs
    pub settings: Arc<dyn SettingsStore>,
    /// Session-config file used when save/load is called without a path
    pub session_path: PathBuf,
    /// When true, `Debug` and `Trace` submissions are suppressed entirely
    pub release_mode: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            settings: Arc::new(MemorySettings::new()),
            session_path: PathBuf::from(DEFAULT_SESSION_FILE),
            release_mode: !cfg!(debug_assertions),
        }
    }
}

struct LoggerInner {
    engines: Vec<Arc<dyn LoggerEngine>>,
    threshold: LogLevel,
    priority_formatter: Option<Arc<dyn FormattingEngine>>,
    default_formatting_engine: String,
    remember_session_config: bool,
    native_handler: bool,
    initialized: bool,
}

pub struct Logger {
    inner: RwLock<LoggerInner>,
    registry: RwLock<FormattingRegistry>,
    factory: RwLock<EngineFactory>,
    settings: Arc<dyn SettingsStore>,
    session_path: PathBuf,
    release_mode: AtomicBool,
    /// Shared with any installed bridge layer; gates interception
    bridge_enabled: Arc<AtomicBool>,
    console: Arc<dyn LoggerEngine>,
    native: Arc<dyn LoggerEngine>,
    event_tx: broadcast::Sender<EngineEvent>,
    priority_tx: broadcast::Sender<PriorityMessage>,
}

static GLOBAL_LOGGER: OnceLock<Arc<Logger>> = OnceLock::new();

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (priority_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: RwLock::new(LoggerInner {
                engines: Vec::new(),
                threshold: LogLevel::Debug,
                priority_formatter: None,
                default_formatting_engine: String::from("Uninitialized"),
                remember_session_config: false,
                native_handler: false,
                initialized: false,
            }),
            registry: RwLock::new(FormattingRegistry::new()),
            factory: RwLock::new(EngineFactory::new()),
            settings: config.settings,
            session_path: config.session_path,
            release_mode: AtomicBool::new(config.release_mode),
            bridge_enabled: Arc::new(AtomicBool::new(false)),
            console: Arc::new(ConsoleSink::new()),
            native: Arc::new(NativeDebugSink::new()),
            event_tx,
            priority_tx,
        }
    }

    /// Process-wide instance, created with default configuration on first
    /// access. Applications that need custom configuration should build
    /// their own [`Logger`] and inject it instead.
    pub fn global() -> &'static Arc<Logger> {
        GLOBAL_LOGGER.get_or_init(|| Arc::new(Logger::new(LoggerConfig::default())))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════

    /// Populate built-in formatting engines and factories, attach the two
    /// permanent sinks (inactive), read stored preferences, and reload the
    /// persisted session when configured to. Idempotent.
    ///
    /// Diagnostics here go through `tracing` since no sinks are attached
    /// yet at this stage.
    pub fn initialize(&self) -> LogResult<()> {
        if self.inner.read().initialized {
            return Ok(());
        }

        info!(target: "fanlog", "logging framework initialization started");

        {
            let mut registry = self.registry.write();
            registry.register(Arc::new(DefaultFormatter));
            registry.register(Arc::new(RichTextFormatter));
            registry.register(Arc::new(XmlFormatter));
            registry.register(Arc::new(HtmlFormatter));
            registry.register(Arc::new(NativeFormatter));
        }
        self.inner.write().default_formatting_engine = FORMATTER_DEFAULT.to_string();

        self.factory
            .write()
            .register_constructor(FILE_SINK_TAG, FileSink::constructor());

        debug!(
            target: "fanlog",
            formatting_engines = self.registry.read().len(),
            factory_tags = self.factory.read().tags().len(),
            "built-ins registered"
        );

        self.native
            .install_formatting_engine(self.registry.read().by_name(FORMATTER_NATIVE));
        self.attach_engine(self.native.clone(), true)?;

        self.console
            .install_formatting_engine(self.registry.read().by_name(FORMATTER_DEFAULT));
        self.attach_engine(self.console.clone(), true)?;

        self.read_settings();

        if self.inner.read().remember_session_config && self.session_path.exists() {
            if let Err(e) = self.load_session_config(None) {
                warn!(target: "fanlog", "could not restore session config: {}", e);
            }
        }

        self.inner.write().initialized = true;
        info!(target: "fanlog", "logging framework initialization finished");
        Ok(())
    }

    /// Persist the session when configured to, then clear all
    /// non-permanent engines.
    pub fn finalize(&self) {
        if self.inner.read().remember_session_config {
            if let Err(e) = self.save_session_config(None) {
                warn!(target: "fanlog", "could not save session config: {}", e);
            }
        }
        self.clear_engines();
    }

    fn is_permanent(&self, engine: &Arc<dyn LoggerEngine>) -> bool {
        Arc::ptr_eq(engine, &self.console) || Arc::ptr_eq(engine, &self.native)
    }

    /// Remove and drop every attached engine except the two permanent
    /// built-ins.
    pub fn clear_engines(&self) {
        let removed: Vec<Arc<dyn LoggerEngine>> = {
            let mut inner = self.inner.write();
            let mut removed = Vec::new();
            inner.engines.retain(|e| {
                if self.is_permanent(e) {
                    true
                } else {
                    removed.push(e.clone());
                    false
                }
            });
            removed
        };
        for engine in removed {
            let _ = self.event_tx.send(EngineEvent {
                name: engine.name(),
                change: EngineChange::Removed,
            });
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Engine attach/detach protocol
    // ═══════════════════════════════════════════════════════════════════

    /// Add an engine to the live set. With `init` true the engine's
    /// `initialize()` runs first; on failure the engine is dropped, the
    /// failure is logged through the logger itself, and an error is
    /// returned without touching the live set.
    pub fn attach_engine(&self, engine: Arc<dyn LoggerEngine>, init: bool) -> LogResult<()> {
        if init {
            if let Err(e) = engine.initialize() {
                let reason = format!(
                    "engine '{}' could not be attached, initialization failed: {}",
                    engine.name(),
                    e
                );
                self.submit("Logger", LogLevel::Error, vec![reason.clone()]);
                return Err(LogError::EngineInitFailed(reason));
            }
        }

        let name = engine.name();
        self.inner.write().engines.push(engine);
        let _ = self.event_tx.send(EngineEvent {
            name,
            change: EngineChange::Added,
        });
        Ok(())
    }

    /// Remove an engine by identity. Returns false (no side effect) when
    /// the engine is not in the live set.
    pub fn detach_engine(&self, engine: &Arc<dyn LoggerEngine>) -> bool {
        let removed = {
            let mut inner = self.inner.write();
            match inner.engines.iter().position(|e| Arc::ptr_eq(e, engine)) {
                Some(pos) => {
                    inner.engines.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            let _ = self.event_tx.send(EngineEvent {
                name: engine.name(),
                change: EngineChange::Removed,
            });
        }
        removed
    }

    /// Remove the first engine carrying the given name.
    pub fn detach_engine_by_name(&self, name: &str) -> bool {
        match self.engine(name) {
            Some(engine) => self.detach_engine(&engine),
            None => false,
        }
    }

    /// First attached engine with the given name.
    pub fn engine(&self, name: &str) -> Option<Arc<dyn LoggerEngine>> {
        self.inner
            .read()
            .engines
            .iter()
            .find(|e| e.name() == name)
            .cloned()
    }

    /// Attached engine at a position in attachment order.
    pub fn engine_at(&self, index: usize) -> Option<Arc<dyn LoggerEngine>> {
        self.inner.read().engines.get(index).cloned()
    }

    pub fn attached_engine_names(&self) -> Vec<String> {
        self.inner.read().engines.iter().map(|e| e.name()).collect()
    }

    pub fn attached_engine_count(&self) -> usize {
        self.inner.read().engines.len()
    }

    /// Turn an engine's output gate on. The engine stays attached and
    /// keeps receiving broadcasts either way.
    pub fn enable_engine(&self, name: &str) -> LogResult<()> {
        let engine = self
            .engine(name)
            .ok_or_else(|| LogError::EngineNotFound(name.to_string()))?;
        engine.set_active(true);
        Ok(())
    }

    /// Turn an engine's output gate off without detaching it.
    pub fn disable_engine(&self, name: &str) -> LogResult<()> {
        let engine = self
            .engine(name)
            .ok_or_else(|| LogError::EngineNotFound(name.to_string()))?;
        engine.set_active(false);
        Ok(())
    }

    pub fn enable_all_engines(&self) {
        for engine in self.inner.read().engines.iter() {
            engine.set_active(true);
        }
    }

    pub fn disable_all_engines(&self) {
        for engine in self.inner.read().engines.iter() {
            engine.set_active(false);
        }
    }

    /// Toggle the permanent console sink, when attached.
    pub fn toggle_console_engine(&self, toggle: bool) {
        if self
            .inner
            .read()
            .engines
            .iter()
            .any(|e| Arc::ptr_eq(e, &self.console))
        {
            self.console.set_active(toggle);
        }
    }

    /// Toggle the permanent native-debug-channel sink, when attached.
    pub fn toggle_native_engine(&self, toggle: bool) {
        if self
            .inner
            .read()
            .engines
            .iter()
            .any(|e| Arc::ptr_eq(e, &self.native))
        {
            self.native.set_active(toggle);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Message dispatch
    // ═══════════════════════════════════════════════════════════════════

    /// Submit a message for broadcast to every attached engine.
    ///
    /// Rejected silently when the level is a sentinel, when its rank
    /// exceeds the global threshold, when the part list is empty, or when
    /// release mode suppresses `Debug`/`Trace`. Dispatch is synchronous:
    /// slow sinks block the caller, and a single submitting thread's
    /// messages reach every sink in submission order.
    pub fn submit(&self, source: &str, level: LogLevel, parts: Vec<String>) {
        if let Some(message) = self.filter(source, level, parts) {
            let engines = self.inner.read().engines.clone();
            for engine in &engines {
                engine.handle_message(&message);
            }
        }
    }

    /// Like [`Logger::submit`], but additionally renders a single string
    /// through the priority formatting engine (falling back to the first
    /// part's plain text) and emits it on the priority channel.
    pub fn submit_priority(&self, source: &str, level: LogLevel, parts: Vec<String>) {
        if let Some(message) = self.filter(source, level, parts) {
            let (engines, formatter) = {
                let inner = self.inner.read();
                (inner.engines.clone(), inner.priority_formatter.clone())
            };
            for engine in &engines {
                engine.handle_message(&message);
            }

            let rendered = match formatter {
                Some(formatter) => formatter.format_message(message.level, &message.parts),
                None => message.parts[0].clone(),
            };
            let _ = self.priority_tx.send(PriorityMessage {
                level: message.level,
                rendered,
            });
        }
    }

    fn filter(&self, source: &str, level: LogLevel, parts: Vec<String>) -> Option<LogMessage> {
        if level.is_sentinel() || parts.is_empty() {
            return None;
        }
        if self.release_mode.load(Ordering::Relaxed)
            && matches!(level, LogLevel::Debug | LogLevel::Trace)
        {
            return None;
        }
        if level > self.inner.read().threshold {
            return None;
        }
        Some(LogMessage::new(source, level, parts))
    }

    /// Subscribe to engine-count-changed notifications.
    pub fn subscribe_engine_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to the priority-message channel.
    pub fn subscribe_priority(&self) -> broadcast::Receiver<PriorityMessage> {
        self.priority_tx.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Formatting engines
    // ═══════════════════════════════════════════════════════════════════

    pub fn register_formatting_engine(&self, engine: Arc<dyn FormattingEngine>) -> bool {
        self.registry.write().register(engine)
    }

    pub fn available_formatting_engines(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn formatting_engine(&self, name: &str) -> Option<Arc<dyn FormattingEngine>> {
        self.registry.read().by_name(name)
    }

    pub fn formatting_engine_by_extension(&self, ext: &str) -> Option<Arc<dyn FormattingEngine>> {
        self.registry.read().by_extension(ext)
    }

    pub fn formatting_engine_at(&self, index: usize) -> Option<Arc<dyn FormattingEngine>> {
        self.registry.read().at(index)
    }

    pub fn default_formatting_engine(&self) -> String {
        self.inner.read().default_formatting_engine.clone()
    }

    /// Install the formatting engine used to render priority messages.
    ///
    /// # Errors
    ///
    /// Returns `LogError::UnknownFormattingEngine` when the name is not in
    /// the registry.
    pub fn set_priority_formatting_engine(&self, name: &str) -> LogResult<()> {
        let engine = self
            .registry
            .read()
            .by_name(name)
            .ok_or_else(|| LogError::UnknownFormattingEngine(name.to_string()))?;
        self.inner.write().priority_formatter = Some(engine);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Engine factory
    // ═══════════════════════════════════════════════════════════════════

    pub fn register_engine_constructor(&self, tag: &str, constructor: EngineConstructor) {
        self.factory.write().register_constructor(tag, constructor);
    }

    pub fn available_engine_tags(&self) -> Vec<String> {
        self.factory.read().tags()
    }

    /// Construct a new, unattached engine for a registered tag.
    ///
    /// # Panics
    ///
    /// Panics on an unknown tag (see [`EngineFactory::create`]).
    pub fn new_engine(
        &self,
        tag: &str,
        formatter: Option<Arc<dyn FormattingEngine>>,
    ) -> Arc<dyn LoggerEngine> {
        let engine = self.factory.read().create(tag);
        if formatter.is_some() {
            engine.install_formatting_engine(formatter);
        }
        engine
    }

    /// Create, configure, and attach a file sink in one step.
    ///
    /// The formatting engine is resolved by name when given, otherwise by
    /// the file extension of `path`. The engine name must not already be
    /// attached.
    pub fn new_file_engine(
        &self,
        name: &str,
        path: &Path,
        formatting: Option<&str>,
    ) -> LogResult<Arc<dyn LoggerEngine>> {
        if path.as_os_str().is_empty() {
            return Err(LogError::EngineInitFailed(
                "file engine requires a file path".to_string(),
            ));
        }
        if self.engine(name).is_some() {
            return Err(LogError::DuplicateEngineName(name.to_string()));
        }

        let formatter = match formatting {
            Some(formatter_name) => self
                .registry
                .read()
                .by_name(formatter_name)
                .ok_or_else(|| LogError::UnknownFormattingEngine(formatter_name.to_string()))?,
            None => {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                self.registry.read().by_extension(ext).ok_or_else(|| {
                    LogError::UnknownFormattingEngine(format!(
                        "no formatting engine associated with extension '{}'",
                        ext
                    ))
                })?
            }
        };

        let sink: Arc<dyn LoggerEngine> = Arc::new(FileSink::new(name, path));
        sink.install_formatting_engine(Some(formatter));
        self.attach_engine(sink.clone(), true)?;
        Ok(sink)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Global level & preferences
    // ═══════════════════════════════════════════════════════════════════

    pub fn global_level(&self) -> LogLevel {
        self.inner.read().threshold
    }

    /// Change the global verbosity threshold; persisted immediately and
    /// announced through the logger's own dispatch path.
    pub fn set_global_level(&self, level: LogLevel) {
        {
            let mut inner = self.inner.write();
            if inner.threshold == level {
                return;
            }
            inner.threshold = level;
        }
        self.write_settings();
        self.submit(
            "Logger",
            LogLevel::Info,
            vec![format!("Global log level changed to {}", level)],
        );
    }

    pub fn set_remember_session_config(&self, remember: bool) {
        {
            let mut inner = self.inner.write();
            if inner.remember_session_config == remember {
                return;
            }
            inner.remember_session_config = remember;
        }
        self.write_settings();
    }

    pub fn remember_session_config(&self) -> bool {
        self.inner.read().remember_session_config
    }

    /// Suppress `Debug`/`Trace` submissions entirely, independent of the
    /// threshold. Defaults from the build profile but stays a runtime
    /// switch.
    pub fn set_release_mode(&self, release: bool) {
        self.release_mode.store(release, Ordering::Relaxed);
    }

    pub fn release_mode(&self) -> bool {
        self.release_mode.load(Ordering::Relaxed)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Native handler flag (see crate::bridge for the interception layer)
    // ═══════════════════════════════════════════════════════════════════

    /// Flag shared with bridge layers created for this logger.
    pub(crate) fn bridge_enabled(&self) -> Arc<AtomicBool> {
        self.bridge_enabled.clone()
    }

    /// Start routing intercepted native debug messages through this
    /// logger. The bridge layer itself must have been composed into the
    /// process subscriber (see [`crate::bridge::install_global`]).
    pub fn install_as_native_handler(&self, update_stored_settings: bool) {
        self.bridge_enabled.store(true, Ordering::Relaxed);
        self.inner.write().native_handler = true;
        if update_stored_settings {
            self.write_settings();
        }
        self.submit(
            "Logger",
            LogLevel::Info,
            vec!["Capturing of native debug messages is now enabled".to_string()],
        );
    }

    /// Stop routing intercepted native debug messages through this logger.
    pub fn uninstall_as_native_handler(&self) {
        self.bridge_enabled.store(false, Ordering::Relaxed);
        self.inner.write().native_handler = false;
        self.write_settings();
        self.submit(
            "Logger",
            LogLevel::Info,
            vec!["Capturing of native debug messages is now disabled".to_string()],
        );
    }

    pub fn is_native_handler(&self) -> bool {
        self.inner.read().native_handler
    }

    // ═══════════════════════════════════════════════════════════════════
    // Settings collaborator
    // ═══════════════════════════════════════════════════════════════════

    /// Restore threshold, native-handler flag, and remember flag from the
    /// settings store. Missing keys keep their defaults, except the
    /// remember flag which defaults to true.
    pub fn read_settings(&self) {
        let mut inner = self.inner.write();
        if let Some(value) = self.settings.get(keys::GLOBAL_LOG_LEVEL) {
            if let Some(level) = LogLevel::parse(&value) {
                inner.threshold = level;
            }
        }
        inner.native_handler =
            self.settings.get(keys::IS_NATIVE_HANDLER).as_deref() == Some("true");
        inner.remember_session_config = self
            .settings
            .get(keys::REMEMBER_SESSION_CONFIG)
            .map(|v| v == "true")
            .unwrap_or(true);
        self.bridge_enabled
            .store(inner.native_handler, Ordering::Relaxed);
    }

    /// Write the current preference values through the settings store.
    pub fn write_settings(&self) {
        let (threshold, native_handler, remember) = {
            let inner = self.inner.read();
            (
                inner.threshold,
                inner.native_handler,
                inner.remember_session_config,
            )
        };
        self.settings.set(keys::GLOBAL_LOG_LEVEL, threshold.as_str());
        self.settings.set(
            keys::IS_NATIVE_HANDLER,
            if native_handler { "true" } else { "false" },
        );
        self.settings.set(
            keys::REMEMBER_SESSION_CONFIG,
            if remember { "true" } else { "false" },
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // Session persistence
    // ═══════════════════════════════════════════════════════════════════

    /// Save the current sink configuration to a versioned binary file.
    ///
    /// Streams directly to the destination; a failure partway through
    /// leaves a truncated file that will read back as corrupt.
    pub fn save_session_config(&self, path: Option<&Path>) -> LogResult<()> {
        let path = path.unwrap_or(&self.session_path);
        debug!(target: "fanlog", path = %path.display(), "session config export started");

        let (threshold, engines) = {
            let inner = self.inner.read();
            (inner.threshold, inner.engines.clone())
        };

        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        session::write_session(&mut writer, threshold, &engines)?;
        std::io::Write::flush(&mut writer)?;

        self.submit(
            "Logger",
            LogLevel::Info,
            vec![format!(
                "Session config successfully exported to {}",
                path.display()
            )],
        );
        Ok(())
    }

    /// Replace the exportable sink configuration from a session file,
    /// all-or-nothing.
    ///
    /// The whole byte stream is parsed and validated (including the
    /// trailing marker) and every reconstructed engine is initialized
    /// before any live state changes. On any failure the reconstructed
    /// instances are dropped and the live configuration is untouched. On
    /// success, currently attached exportable engines are replaced with
    /// the reconstructed set, per-engine formatting/activity is restored
    /// by name (unknown names are skipped), and the stored threshold is
    /// adopted.
    pub fn load_session_config(&self, path: Option<&Path>) -> LogResult<()> {
        let path = path.unwrap_or(&self.session_path);
        debug!(target: "fanlog", path = %path.display(), "session config import started");

        let data = std::fs::read(path)?;
        let parsed = {
            let factory = self.factory.read();
            session::parse_session(&data, &factory)?
        };

        for engine in &parsed.engines {
            if let Err(e) = engine.initialize() {
                return Err(LogError::EngineInitFailed(format!(
                    "engine '{}' failed to initialize during session import: {}",
                    engine.name(),
                    e
                )));
            }
        }

        let mut removed = Vec::new();
        let added: Vec<String> = parsed.engines.iter().map(|e| e.name()).collect();
        {
            let registry = self.registry.read();
            let mut inner = self.inner.write();

            inner.engines.retain(|e| {
                if e.exportable().is_some() {
                    removed.push(e.clone());
                    false
                } else {
                    true
                }
            });
            inner.engines.extend(parsed.engines.iter().cloned());

            for props in &parsed.properties {
                if let Some(engine) = inner.engines.iter().find(|e| e.name() == props.name) {
                    if let Some(formatter) = registry.by_name(&props.formatting_engine) {
                        engine.install_formatting_engine(Some(formatter));
                    }
                    engine.set_active(props.active);
                }
            }

            inner.threshold = parsed.threshold;
        }

        for engine in removed {
            let _ = self.event_tx.send(EngineEvent {
                name: engine.name(),
                change: EngineChange::Removed,
            });
        }
        for name in added {
            let _ = self.event_tx.send(EngineEvent {
                name,
                change: EngineChange::Added,
            });
        }

        self.write_settings();
        self.submit(
            "Logger",
            LogLevel::Info,
            vec![format!(
                "Session config successfully imported from {}",
                path.display()
            )],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineCommon;
    use parking_lot::Mutex;

    struct RecordingSink {
        common: EngineCommon,
        lines: Mutex<Vec<(LogLevel, String)>>,
        fail_init: bool,
    }

    impl RecordingSink {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                common: EngineCommon::new(name),
                lines: Mutex::new(Vec::new()),
                fail_init: false,
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                common: EngineCommon::new(name),
                lines: Mutex::new(Vec::new()),
                fail_init: true,
            })
        }

        fn recorded(&self) -> Vec<(LogLevel, String)> {
            self.lines.lock().clone()
        }
    }

    impl LoggerEngine for RecordingSink {
        fn common(&self) -> &EngineCommon {
            &self.common
        }

        fn initialize(&self) -> LogResult<()> {
            if self.fail_init {
                Err(LogError::EngineInitFailed("configured to fail".to_string()))
            } else {
                Ok(())
            }
        }

        fn emit(&self, level: LogLevel, rendered: &str) {
            self.lines.lock().push((level, rendered.to_string()));
        }
    }

    fn test_logger() -> Logger {
        let logger = Logger::new(LoggerConfig {
            release_mode: false,
            ..LoggerConfig::default()
        });
        logger.initialize().unwrap();
        logger
    }

    #[test]
    fn test_initialize_attaches_permanent_sinks() {
        let logger = test_logger();
        let names = logger.attached_engine_names();
        assert_eq!(names, vec!["Native Debug", "Console"]);

        // Permanent sinks start inactive.
        for name in names {
            assert!(!logger.engine(&name).unwrap().is_active());
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let logger = test_logger();
        logger.initialize().unwrap();
        assert_eq!(logger.attached_engine_count(), 2);
        assert_eq!(logger.available_formatting_engines().len(), 5);
    }

    #[test]
    fn test_clear_engines_keeps_permanents() {
        let logger = test_logger();
        let sink: Arc<dyn LoggerEngine> = RecordingSink::new("recorder");
        logger.attach_engine(sink, true).unwrap();
        assert_eq!(logger.attached_engine_count(), 3);

        logger.clear_engines();
        assert_eq!(
            logger.attached_engine_names(),
            vec!["Native Debug", "Console"]
        );
    }

    #[test]
    fn test_attach_init_failure_discards_engine() {
        let logger = test_logger();
        let sink: Arc<dyn LoggerEngine> = RecordingSink::failing("doomed");

        let result = logger.attach_engine(sink, true);
        assert!(matches!(result, Err(LogError::EngineInitFailed(_))));
        assert!(!logger.attached_engine_names().contains(&"doomed".to_string()));
    }

    #[test]
    fn test_detach_missing_engine_is_noop() {
        let logger = test_logger();
        let before = logger.attached_engine_names();

        let stranger: Arc<dyn LoggerEngine> = RecordingSink::new("stranger");
        assert!(!logger.detach_engine(&stranger));
        assert!(!logger.detach_engine_by_name("stranger"));
        assert_eq!(logger.attached_engine_names(), before);
    }

    #[test]
    fn test_threshold_filtering() {
        let logger = test_logger();
        logger.set_global_level(LogLevel::Warning);

        let sink = RecordingSink::new("recorder");
        let dyn_sink: Arc<dyn LoggerEngine> = sink.clone();
        logger.attach_engine(dyn_sink, true).unwrap();
        logger.enable_engine("recorder").unwrap();

        logger.submit("All", LogLevel::Info, vec!["info".to_string()]);
        logger.submit("All", LogLevel::Warning, vec!["warning".to_string()]);
        // Error ranks above the Warning threshold on the verbosity scale.
        logger.submit("All", LogLevel::Error, vec!["error".to_string()]);
        logger.submit("All", LogLevel::Debug, vec!["debug".to_string()]);

        let levels: Vec<LogLevel> = sink.recorded().iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warning]);
    }

    #[test]
    fn test_sentinel_levels_always_rejected() {
        let logger = test_logger();
        logger.set_global_level(LogLevel::AllLogLevels);

        let sink = RecordingSink::new("recorder");
        let dyn_sink: Arc<dyn LoggerEngine> = sink.clone();
        logger.attach_engine(dyn_sink, true).unwrap();
        logger.enable_engine("recorder").unwrap();

        logger.submit("All", LogLevel::None, vec!["none".to_string()]);
        logger.submit("All", LogLevel::AllLogLevels, vec!["all".to_string()]);
        assert!(sink.recorded().is_empty());
    }

    #[test]
    fn test_release_mode_suppresses_debug_and_trace() {
        let logger = test_logger();
        logger.set_global_level(LogLevel::AllLogLevels);
        logger.set_release_mode(true);

        let sink = RecordingSink::new("recorder");
        let dyn_sink: Arc<dyn LoggerEngine> = sink.clone();
        logger.attach_engine(dyn_sink, true).unwrap();
        logger.enable_engine("recorder").unwrap();

        logger.submit("All", LogLevel::Debug, vec!["debug".to_string()]);
        logger.submit("All", LogLevel::Trace, vec!["trace".to_string()]);
        logger.submit("All", LogLevel::Error, vec!["error".to_string()]);

        let levels: Vec<LogLevel> = sink.recorded().iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![LogLevel::Error]);
    }

    #[test]
    fn test_inactive_engine_receives_but_suppresses() {
        let logger = test_logger();
        logger.set_global_level(LogLevel::Debug);

        let sink = RecordingSink::new("recorder");
        let dyn_sink: Arc<dyn LoggerEngine> = sink.clone();
        logger.attach_engine(dyn_sink, true).unwrap();
        // Never enabled: attached, receives broadcasts, emits nothing.

        logger.submit("All", LogLevel::Info, vec!["quiet".to_string()]);
        assert!(sink.recorded().is_empty());
        assert!(logger.attached_engine_names().contains(&"recorder".to_string()));
    }

    #[test]
    fn test_priority_channel_fires_once() {
        let logger = test_logger();
        logger.set_global_level(LogLevel::Warning);
        let mut rx = logger.subscribe_priority();

        logger.submit_priority("All", LogLevel::Warning, vec!["boom".to_string()]);
        // Above the threshold rank: no priority event either.
        logger.submit_priority("All", LogLevel::Debug, vec!["quiet".to_string()]);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.level, LogLevel::Warning);
        assert_eq!(event.rendered, "boom");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_priority_uses_installed_formatter() {
        let logger = test_logger();
        logger.set_priority_formatting_engine(FORMATTER_NATIVE).unwrap();
        let mut rx = logger.subscribe_priority();

        logger.submit_priority("All", LogLevel::Warning, vec!["caution".to_string()]);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.rendered, "Warning: caution");
    }

    #[test]
    fn test_priority_formatter_unknown_name() {
        let logger = test_logger();
        assert!(matches!(
            logger.set_priority_formatting_engine("Nope"),
            Err(LogError::UnknownFormattingEngine(_))
        ));
    }

    #[test]
    fn test_engine_events() {
        let logger = test_logger();
        let mut rx = logger.subscribe_engine_events();

        let sink: Arc<dyn LoggerEngine> = RecordingSink::new("recorder");
        logger.attach_engine(sink.clone(), true).unwrap();
        logger.detach_engine(&sink);

        let added = rx.try_recv().unwrap();
        assert_eq!(added.name, "recorder");
        assert_eq!(added.change, EngineChange::Added);

        let removed = rx.try_recv().unwrap();
        assert_eq!(removed.change, EngineChange::Removed);
    }

    #[test]
    fn test_enable_unknown_engine() {
        let logger = test_logger();
        assert!(matches!(
            logger.enable_engine("ghost"),
            Err(LogError::EngineNotFound(_))
        ));
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Arc::new(MemorySettings::new());
        let logger = Logger::new(LoggerConfig {
            settings: settings.clone(),
            release_mode: false,
            ..LoggerConfig::default()
        });
        logger.initialize().unwrap();

        logger.set_global_level(LogLevel::Trace);
        logger.set_remember_session_config(false);

        let other = Logger::new(LoggerConfig {
            settings,
            release_mode: false,
            ..LoggerConfig::default()
        });
        other.initialize().unwrap();
        assert_eq!(other.global_level(), LogLevel::Trace);
        assert!(!other.remember_session_config());
    }

    #[test]
    fn test_new_file_engine_duplicate_name() {
        let logger = test_logger();
        let temp = tempfile::TempDir::new().unwrap();

        logger
            .new_file_engine("session", &temp.path().join("a.log"), None)
            .unwrap();
        assert!(matches!(
            logger.new_file_engine("session", &temp.path().join("b.log"), None),
            Err(LogError::DuplicateEngineName(_))
        ));
    }

    #[test]
    fn test_new_file_engine_formatter_from_extension() {
        let logger = test_logger();
        let temp = tempfile::TempDir::new().unwrap();

        let sink = logger
            .new_file_engine("xml-log", &temp.path().join("log.xml"), None)
            .unwrap();
        assert_eq!(sink.formatting_engine_name(), crate::format::FORMATTER_XML);

        assert!(matches!(
            logger.new_file_engine("odd", &temp.path().join("log.bin"), None),
            Err(LogError::UnknownFormattingEngine(_))
        ));
    }
}
