//! Tag-to-constructor registry for sink engines.
//!
//! The factory is purely a construction mechanism: it maps string tags to
//! constructors and does not track the instances it creates. The same tags
//! identify concrete types inside persisted session files.

use std::sync::Arc;

use crate::engine::LoggerEngine;

/// Constructor producing a fresh, unattached engine instance.
pub type EngineConstructor = Box<dyn Fn() -> Arc<dyn LoggerEngine> + Send + Sync>;

/// Registry mapping factory tags to engine constructors.
#[derive(Default)]
pub struct EngineFactory {
    constructors: Vec<(String, EngineConstructor)>,
}

impl EngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a tag, replacing any previous
    /// registration for the same tag.
    pub fn register_constructor(&mut self, tag: impl Into<String>, constructor: EngineConstructor) {
        let tag = tag.into();
        if let Some(entry) = self.constructors.iter_mut().find(|(t, _)| *t == tag) {
            entry.1 = constructor;
        } else {
            self.constructors.push((tag, constructor));
        }
    }

    /// Construct a new instance for a registered tag, or `None` when the
    /// tag is unknown. Used by session loading, where tags come from
    /// untrusted file contents.
    pub fn try_create(&self, tag: &str) -> Option<Arc<dyn LoggerEngine>> {
        self.constructors
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, ctor)| ctor())
    }

    /// Construct a new instance for a registered tag.
    ///
    /// # Panics
    ///
    /// Panics when the tag has not been registered. Callers must only pass
    /// tags previously registered; use [`EngineFactory::tags`] for
    /// discovery and [`EngineFactory::try_create`] for untrusted input.
    pub fn create(&self, tag: &str) -> Arc<dyn LoggerEngine> {
        match self.try_create(tag) {
            Some(engine) => engine,
            None => panic!(
                "unknown logger engine tag '{}' (registered tags: {:?})",
                tag,
                self.tags()
            ),
        }
    }

    /// Registered tags, in registration order.
    pub fn tags(&self) -> Vec<String> {
        self.constructors.iter().map(|(t, _)| t.clone()).collect()
    }
}
