//! # Handler Layer
//!
//! This module defines the handler abstraction for logctx. The [`Handler`]
//! trait is the seam between the logger front end and whatever actually
//! formats and emits records.
//!
//! ## Design Rationale
//!
//! Handlers are abstracted behind a trait to:
//! - Let the context-tracking decorator ([`crate::context::ContextHandler`])
//!   wrap **any** base handler without knowing its internals
//! - Enable **testing** with [`memory::MemoryHandler`] (no I/O needed)
//! - Allow different output formats without changing the front end
//!
//! ## Implementations
//!
//! - [`text::TextHandler`]: `key=value` line output (logfmt style)
//! - [`json::JsonHandler`]: one JSON object per record
//! - [`memory::MemoryHandler`]: captures records for assertions
//! - [`crate::context::ContextHandler`]: decorator that forwards to a base
//!   handler while shadowing the accumulated attribute context
//!
//! ## Derivation Model
//!
//! `with_attrs` and `with_group` never mutate: each returns a brand-new
//! handler sharing the underlying sink. Two handlers derived from a common
//! ancestor can be used from different threads without coordination,
//! because neither observes the other's state.

use crate::attr::{Attr, Value};
use crate::error::Result;
use crate::model::{Level, Record};
use std::any::Any;
use std::sync::Arc;

pub mod json;
pub mod memory;
pub mod text;

/// Abstract interface for log record handling.
pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be emitted
    fn enabled(&self, level: Level) -> bool;

    /// Emit a single record
    fn handle(&self, record: &Record) -> Result<()>;

    /// Derive a handler with `attrs` added to its accumulated state
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// Derive a handler with a group named `name` opened; attributes added
    /// afterwards belong to that group
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;

    /// Concrete-type access, for collaborators that recognize a specific
    /// handler type (see [`crate::context::context_string`])
    fn as_any(&self) -> &dyn Any;
}

/// Flatten an attribute tree into `(dotted key, scalar value)` pairs.
///
/// Lazy values are resolved, empty values and empty groups are dropped,
/// and an empty group name adds no prefix segment.
pub(crate) fn flatten_attrs(out: &mut Vec<(String, Value)>, prefix: &str, attrs: &[Attr]) {
    for attr in attrs {
        let value = attr.value.resolve();
        match value {
            Value::Empty => {}
            Value::Group(children) => {
                if children.is_empty() {
                    continue;
                }
                let child_prefix = if attr.key.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{}{}.", prefix, attr.key)
                };
                flatten_attrs(out, &child_prefix, &children);
            }
            other => out.push((format!("{}{}", prefix, attr.key), other)),
        }
    }
}
