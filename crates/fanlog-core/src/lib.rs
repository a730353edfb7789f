//! # fanlog-core
//!
//! A pluggable, multi-sink logging engine: a central router receives
//! leveled messages, filters them against a global verbosity threshold,
//! and broadcasts survivors to a dynamic set of sink engines. Each sink
//! renders messages through an interchangeable formatting strategy and
//! writes them to its destination (console, file, the native debug
//! channel, or anything user-defined).
//!
//! ## Architecture
//!
//! - **[`logger`]**: the [`Logger`] core - dispatch, the engine
//!   attach/detach protocol, level administration, and session
//!   orchestration
//! - **[`engine`]**: the [`LoggerEngine`] sink contract plus the built-in
//!   console, file, and native-debug sinks
//! - **[`format`]**: the [`FormattingEngine`] strategy contract and the
//!   five built-in renderings (plain, rich text, XML, HTML, native)
//! - **[`factory`]**: tag-indexed construction of sink engines, used to
//!   reconstruct sinks from persisted sessions
//! - **[`session`]**: the versioned binary session-config codec with
//!   all-or-nothing import
//! - **[`settings`]**: the preference store remembering the threshold and
//!   handler flags across runs
//! - **[`bridge`]**: a `tracing` layer routing native debug events into
//!   the logger
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use fanlog_core::{log_info, Logger, LoggerConfig, LogLevel};
//!
//! let logger = Arc::new(Logger::new(LoggerConfig::default()));
//! logger.initialize()?;
//! logger.toggle_console_engine(true);
//! logger.new_file_engine("session", "output.log".as_ref(), None)?;
//! logger.set_global_level(LogLevel::Debug);
//!
//! log_info!(logger, "ready, pid {}", std::process::id());
//! logger.finalize();
//! ```

pub mod bridge;
pub mod engine;
pub mod error;
pub mod factory;
pub mod format;
pub mod level;
pub mod logger;
mod macros;
pub mod message;
pub mod session;
pub mod settings;

pub use bridge::BridgeLayer;
pub use engine::{
    ConsoleSink, EngineCommon, ExportableEngine, FileSink, LoggerEngine, NativeDebugSink,
    CONSOLE_SINK_NAME, FILE_SINK_TAG, NATIVE_SINK_NAME,
};
pub use error::{LogError, LogResult};
pub use factory::{EngineConstructor, EngineFactory};
pub use format::{
    DefaultFormatter, FormattingEngine, FormattingRegistry, HtmlFormatter, NativeFormatter,
    RichTextFormatter, XmlFormatter, FORMATTER_DEFAULT, FORMATTER_HTML, FORMATTER_NATIVE,
    FORMATTER_RICH_TEXT, FORMATTER_XML,
};
pub use level::LogLevel;
pub use logger::{
    EngineChange, EngineEvent, Logger, LoggerConfig, PriorityMessage, DEFAULT_SESSION_FILE,
};
pub use message::{assemble_parts, LogMessage, MAX_MESSAGE_PARTS};
pub use session::{SESSION_FORMAT_VERSION, SESSION_MARKER};
pub use settings::{JsonSettings, MemorySettings, SettingsStore};
