//! # Logger Front End
//!
//! [`Logger`] is a thin, cloneable facade over a [`Handler`]. It owns no
//! formatting or emission logic of its own: derivation calls go straight
//! to the handler, and `log` builds a [`Record`] and forwards it. All UI
//! surfaces (the demo binary, library consumers) interact through this
//! type rather than handlers directly.
//!
//! A process-wide default logger is available through [`set_default`] and
//! [`default`]; until one is set, it points at a context-tracking handler
//! over stderr text output.

use crate::attr::Attr;
use crate::context::ContextHandler;
use crate::error::Result;
use crate::handler::text::TextHandler;
use crate::handler::Handler;
use crate::model::{Level, Record};
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

static DEFAULT_LOGGER: Lazy<RwLock<Logger>> = Lazy::new(|| {
    let base = Arc::new(TextHandler::stderr());
    RwLock::new(Logger::new(Arc::new(ContextHandler::new(base))))
});

/// Replace the process-wide default logger.
pub fn set_default(logger: Logger) {
    let mut guard = DEFAULT_LOGGER.write().unwrap_or_else(|e| e.into_inner());
    *guard = logger;
}

/// The current process-wide default logger.
pub fn default() -> Logger {
    DEFAULT_LOGGER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Cloneable front end over a handler chain.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Derive a logger with `attrs` added to the accumulated context.
    /// An empty list returns a plain clone.
    pub fn with(&self, attrs: Vec<Attr>) -> Logger {
        if attrs.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.with_attrs(attrs),
        }
    }

    /// Derive a logger with a group named `name` opened; attributes added
    /// afterwards belong to that group. An empty name returns a plain
    /// clone.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.with_group(name),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Emit a record if the handler is enabled for `level`. Emission
    /// failures are the base handler's, propagated unchanged.
    pub fn log(&self, level: Level, message: &str, attrs: Vec<Attr>) -> Result<()> {
        if !self.handler.enabled(level) {
            return Ok(());
        }
        let record = Record::new(level, message).with_attrs(attrs);
        self.handler.handle(&record)
    }

    pub fn debug(&self, message: &str, attrs: Vec<Attr>) {
        let _ = self.log(Level::Debug, message, attrs);
    }

    pub fn info(&self, message: &str, attrs: Vec<Attr>) {
        let _ = self.log(Level::Info, message, attrs);
    }

    pub fn warn(&self, message: &str, attrs: Vec<Attr>) {
        let _ = self.log(Level::Warn, message, attrs);
    }

    pub fn error(&self, message: &str, attrs: Vec<Attr>) {
        let _ = self.log(Level::Error, message, attrs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::memory::fixtures::context_logger;
    use crate::handler::memory::MemoryHandler;

    #[test]
    fn test_with_routes_through_handler() {
        let (logger, handler) = context_logger();
        let derived = logger.with(vec![Attr::str("k", "v")]);
        derived.info("hello", vec![]);
        assert_eq!(handler.records()[0].field("k"), Some("v"));
    }

    #[test]
    fn test_with_empty_attrs_is_a_noop() {
        let (logger, handler) = context_logger();
        let derived = logger.with(vec![]).with_group("");
        derived.info("hello", vec![]);
        let records = handler.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].fields.is_empty());
    }

    #[test]
    fn test_log_passes_call_attrs() {
        let (logger, handler) = context_logger();
        logger
            .log(Level::Warn, "careful", vec![Attr::int("n", 3)])
            .unwrap();
        let records = handler.records();
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].field("n"), Some("3"));
    }

    #[test]
    fn test_log_skips_disabled_levels() {
        // A text handler at the default Info level drops Debug records
        // before they reach the sink.
        let logger = Logger::new(Arc::new(TextHandler::new(Vec::new())));
        assert!(!logger.enabled(Level::Debug));
        logger.log(Level::Debug, "invisible", vec![]).unwrap();
    }

    #[test]
    fn test_default_logger_is_replaceable() {
        let handler = MemoryHandler::new();
        set_default(Logger::new(Arc::new(handler.clone())));
        default().info("through the default", vec![]);
        let records = handler.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "through the default");
    }
}
