use super::{flatten_attrs, Handler};
use crate::attr::{Attr, Value};
use crate::error::Result;
use crate::model::{Level, Record};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// A record as seen by a [`MemoryHandler`], with accumulated and per-call
/// attributes flattened to rendered `(key, value)` text pairs.
#[derive(Debug, Clone)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedRecord {
    /// Look up a flattened field by its dotted key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Capturing handler for tests.
///
/// All handlers derived from one `MemoryHandler` share the same capture
/// buffer, so a test can keep the original around to inspect what any
/// derived logger emitted. Never filters by level.
#[derive(Clone)]
pub struct MemoryHandler {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    fields: Vec<(String, Value)>,
    groups: Vec<String>,
}

impl MemoryHandler {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Snapshot of everything captured so far.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn group_prefix(&self) -> String {
        if self.groups.is_empty() {
            String::new()
        } else {
            format!("{}.", self.groups.join("."))
        }
    }
}

impl Default for MemoryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for MemoryHandler {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn handle(&self, record: &Record) -> Result<()> {
        let mut flat = self.fields.clone();
        flatten_attrs(&mut flat, &self.group_prefix(), &record.attrs);
        let fields = flat
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CapturedRecord {
                level: record.level,
                message: record.message.clone(),
                fields,
            });
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let mut fields = self.fields.clone();
        flatten_attrs(&mut fields, &self.group_prefix(), &attrs);
        Arc::new(Self {
            records: Arc::clone(&self.records),
            fields,
            groups: self.groups.clone(),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let mut groups = self.groups.clone();
        if !name.is_empty() {
            groups.push(name.to_string());
        }
        Arc::new(Self {
            records: Arc::clone(&self.records),
            fields: self.fields.clone(),
            groups,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::context::ContextHandler;
    use crate::logger::Logger;

    /// A context-tracking logger over a fresh capturing handler, plus the
    /// handler itself for assertions.
    pub fn context_logger() -> (Logger, MemoryHandler) {
        let handler = MemoryHandler::new();
        let logger = Logger::new(Arc::new(ContextHandler::new(Arc::new(handler.clone()))));
        (logger, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_message_and_level() {
        let handler = MemoryHandler::new();
        handler.handle(&Record::new(Level::Error, "boom")).unwrap();
        let records = handler.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].message, "boom");
    }

    #[test]
    fn test_derived_handler_shares_buffer() {
        let handler = MemoryHandler::new();
        let derived = handler.with_attrs(vec![Attr::str("k", "v")]);
        derived.handle(&Record::new(Level::Info, "hello")).unwrap();
        let records = handler.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("k"), Some("v"));
    }

    #[test]
    fn test_group_path_prefixes_call_attrs() {
        let handler = MemoryHandler::new();
        let derived = handler.with_group("req");
        derived
            .handle(&Record::new(Level::Info, "hello").with_attrs(vec![Attr::str("id", "9")]))
            .unwrap();
        assert_eq!(handler.records()[0].field("req.id"), Some("9"));
    }

    #[test]
    fn test_always_enabled() {
        let handler = MemoryHandler::new();
        assert!(handler.enabled(Level::Debug));
    }
}
