//! Formatting strategies and their registry.
//!
//! A formatting engine is a stateless strategy converting a leveled
//! message into a rendered string. Engines are registered once at startup
//! and looked up by name or by associated file extension; lookups return
//! an explicit absent result, never an error.

pub mod engines;

use std::sync::Arc;

use crate::level::LogLevel;

pub use engines::{
    DefaultFormatter, HtmlFormatter, NativeFormatter, RichTextFormatter, XmlFormatter,
    FORMATTER_DEFAULT, FORMATTER_HTML, FORMATTER_NATIVE, FORMATTER_RICH_TEXT, FORMATTER_XML,
};

/// A stateless strategy converting `(level, parts)` into a rendered string.
pub trait FormattingEngine: Send + Sync {
    /// Unique name of the strategy.
    fn name(&self) -> &str;

    /// File extension associated with the rendered output (may be empty).
    fn file_extension(&self) -> &str {
        ""
    }

    /// Render the message.
    fn format_message(&self, level: LogLevel, parts: &[String]) -> String;
}

/// Registry of named formatting strategies.
///
/// Populated once at startup; there is no removal operation.
#[derive(Default)]
pub struct FormattingRegistry {
    engines: Vec<Arc<dyn FormattingEngine>>,
}

impl FormattingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy. Returns false without registering when an
    /// engine with the same name is already present.
    pub fn register(&mut self, engine: Arc<dyn FormattingEngine>) -> bool {
        if self.by_name(engine.name()).is_some() {
            return false;
        }
        self.engines.push(engine);
        true
    }

    /// Look up a strategy by name.
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn FormattingEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Look up a strategy by associated file extension.
    pub fn by_extension(&self, extension: &str) -> Option<Arc<dyn FormattingEngine>> {
        self.engines
            .iter()
            .find(|e| !e.file_extension().is_empty() && e.file_extension() == extension)
            .cloned()
    }

    /// Strategy at a registration position.
    pub fn at(&self, index: usize) -> Option<Arc<dyn FormattingEngine>> {
        self.engines.get(index).cloned()
    }

    /// Names of all registered strategies, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
