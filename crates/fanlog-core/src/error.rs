//! Error types for the fanlog engine

use thiserror::Error;

/// Main error type for fanlog operations
#[derive(Error, Debug)]
pub enum LogError {
    /// An engine's `initialize()` reported failure; the engine was discarded
    #[error("Engine initialization failed: {0}")]
    EngineInitFailed(String),

    /// An engine with the same name is already attached
    #[error("Engine name already in use: {0}")]
    DuplicateEngineName(String),

    /// No attached engine carries the given name
    #[error("Engine not found: {0}")]
    EngineNotFound(String),

    /// The named formatting engine is not present in the registry
    #[error("Unknown formatting engine: {0}")]
    UnknownFormattingEngine(String),

    /// A session file was written with an incompatible format version
    #[error("Incompatible session format: found version {found}, expected {expected}")]
    FormatVersionMismatch { found: u32, expected: u32 },

    /// A session file contains invalid or truncated data
    #[error("Corrupt session data: {0}")]
    ConfigCorrupt(String),

    /// Error in the settings collaborator
    #[error("Settings error: {0}")]
    Settings(String),

    /// Native handler installation failed
    #[error("Native handler error: {0}")]
    NativeHandler(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
