//! Native debug channel interception.
//!
//! A [`BridgeLayer`] composes into the process-wide `tracing` subscriber
//! and routes every intercepted event through a [`Logger`] as a message
//! from source `"All"`, mirroring how the logger's own native-debug sink
//! forwards in the opposite direction.
//!
//! Two guards prevent feedback loops: events carrying a `fanlog` target
//! (the native sink and the logger's internal diagnostics) are skipped,
//! and a thread-local re-entrancy flag drops anything emitted while the
//! bridge itself is dispatching.
//!
//! The layer is created disabled. [`Logger::install_as_native_handler`]
//! and [`Logger::uninstall_as_native_handler`] flip the shared flag at
//! runtime; the layer composition itself cannot be undone once handed to
//! `tracing`.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::error::{LogError, LogResult};
use crate::level::LogLevel;
use crate::logger::Logger;

thread_local! {
    static IN_BRIDGE: Cell<bool> = const { Cell::new(false) };
}

/// `tracing` layer forwarding intercepted events into a [`Logger`].
pub struct BridgeLayer {
    logger: Weak<Logger>,
    enabled: Arc<AtomicBool>,
}

impl BridgeLayer {
    /// Build a layer bound to a logger. Holds only a weak reference, so a
    /// dropped logger turns the layer into a no-op rather than keeping it
    /// alive.
    pub fn new(logger: &Arc<Logger>) -> Self {
        Self {
            logger: Arc::downgrade(logger),
            enabled: logger.bridge_enabled(),
        }
    }
}

fn map_level(level: &Level) -> LogLevel {
    if *level == Level::ERROR {
        LogLevel::Error
    } else if *level == Level::WARN {
        LogLevel::Warning
    } else if *level == Level::INFO {
        LogLevel::Info
    } else if *level == Level::DEBUG {
        LogLevel::Debug
    } else {
        LogLevel::Trace
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for BridgeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        if event.metadata().target().starts_with("fanlog") {
            return;
        }
        if IN_BRIDGE.with(|flag| flag.get()) {
            return;
        }
        let Some(logger) = self.logger.upgrade() else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let Some(text) = visitor.message else {
            return;
        };

        let level = map_level(event.metadata().level());
        IN_BRIDGE.with(|flag| flag.set(true));
        logger.submit("All", level, vec![text]);
        IN_BRIDGE.with(|flag| flag.set(false));
    }
}

/// Compose a bridge layer for `logger` into the process-wide subscriber
/// and enable interception.
///
/// # Errors
///
/// Returns `LogError::NativeHandler` when a global subscriber is already
/// installed.
pub fn install_global(logger: &Arc<Logger>) -> LogResult<()> {
    let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LogError::NativeHandler(e.to_string()))?;
    logger.install_as_native_handler(true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCommon, LoggerEngine};
    use crate::logger::LoggerConfig;
    use parking_lot::Mutex;

    struct RecordingSink {
        common: EngineCommon,
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                common: EngineCommon::new("recorder"),
                lines: Mutex::new(Vec::new()),
            })
        }
    }

    impl LoggerEngine for RecordingSink {
        fn common(&self) -> &EngineCommon {
            &self.common
        }

        fn emit(&self, level: LogLevel, rendered: &str) {
            self.lines.lock().push((level, rendered.to_string()));
        }
    }

    fn test_logger() -> Arc<Logger> {
        let logger = Arc::new(Logger::new(LoggerConfig {
            release_mode: false,
            ..LoggerConfig::default()
        }));
        logger.initialize().unwrap();
        logger
    }

    // Attached after any handler install calls, so the install
    // announcement itself is not recorded.
    fn attach_recorder(logger: &Arc<Logger>) -> Arc<RecordingSink> {
        let sink = RecordingSink::new();
        let dyn_sink: Arc<dyn LoggerEngine> = sink.clone();
        logger.attach_engine(dyn_sink, true).unwrap();
        logger.enable_engine("recorder").unwrap();
        sink
    }

    #[test]
    fn test_intercepts_foreign_events() {
        let logger = test_logger();
        logger.install_as_native_handler(false);
        let sink = attach_recorder(&logger);

        let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(&logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("disk almost full");
        });

        let lines = sink.lines.lock();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Warning);
        assert!(lines[0].1.contains("disk almost full"));
    }

    #[test]
    fn test_disabled_bridge_ignores_events() {
        let logger = test_logger();
        let sink = attach_recorder(&logger);
        // Never installed as handler: flag stays off.

        let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(&logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("should not appear");
        });

        assert!(sink.lines.lock().is_empty());
    }

    #[test]
    fn test_uninstall_stops_interception() {
        let logger = test_logger();
        logger.install_as_native_handler(false);
        logger.uninstall_as_native_handler();
        assert!(!logger.is_native_handler());
        let sink = attach_recorder(&logger);

        let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(&logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("late event");
        });

        assert!(sink.lines.lock().is_empty());
    }

    #[test]
    fn test_native_targets_skipped() {
        let logger = test_logger();
        logger.install_as_native_handler(false);
        let sink = attach_recorder(&logger);
        logger.toggle_native_engine(true);

        let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(&logger));
        tracing::subscriber::with_default(subscriber, || {
            // Goes through the native sink, which emits with a fanlog
            // target; the bridge must not pick that back up.
            logger.submit("All", LogLevel::Info, vec!["once only".to_string()]);
        });

        let lines = sink.lines.lock();
        assert_eq!(lines.len(), 1);
    }
}
