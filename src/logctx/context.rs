//! # Context Tracking
//!
//! Structured loggers hand out derived sub-loggers through "with
//! attributes" and "with group" calls, but offer no way to read the
//! accumulated context back out of a handler chain. [`ContextHandler`]
//! closes that gap: it wraps any base [`Handler`] as transparent
//! middleware, forwarding emission decisions and records untouched while
//! keeping its own shadow copy of every attribute and group pushed in.
//!
//! [`context_string`] then renders that shadow copy as a flat, bracketed
//! string: the prefix [`crate::error::ContextError`] puts in front of
//! error messages, so an error built deep inside a request chain carries
//! the same context the surrounding log lines do.
//!
//! ## Accumulation Rules
//!
//! - `with_group(name)` appends an empty group attribute; it becomes the
//!   "open" group.
//! - `with_attrs(attrs)` merges the new attributes into the trailing
//!   element when that element is a group, and appends them as top-level
//!   siblings otherwise. A group stays open until another group is opened
//!   after it.
//!
//! Every derivation clones the accumulated list; no handler instance is
//! mutated after construction, so parent and sibling derivations never
//! observe each other's state.

use crate::attr::{Attr, Value};
use crate::error::Result;
use crate::handler::Handler;
use crate::logger::Logger;
use crate::model::{Level, Record};
use chrono::SecondsFormat;
use std::any::Any;
use std::sync::Arc;

/// What [`context_string`] returns for a logger whose handler is not a
/// [`ContextHandler`].
pub const FOREIGN_LOGGER_CONTEXT: &str = "[logger not using logctx] ";

/// Middleware handler that shadows the attribute context pushed into a
/// base handler chain.
///
/// Requires a target handler as the final destination for records; see
/// the module docs for the accumulation rules.
pub struct ContextHandler {
    target: Arc<dyn Handler>,
    attrs: Vec<Attr>,
}

impl ContextHandler {
    pub fn new(target: Arc<dyn Handler>) -> Self {
        Self {
            target,
            attrs: Vec::new(),
        }
    }

    /// Render the accumulated context as a flat bracketed string.
    ///
    /// String attributes render as `["key" = "value"]`, times as
    /// `["key": "<rfc3339>"]`, anything else as `["key": <value>]`.
    /// Group nesting flattens into dotted key prefixes. The result always
    /// ends in exactly one space; with nothing accumulated it is a single
    /// space.
    pub fn context_string(&self) -> String {
        let mut out = String::new();
        for attr in &self.attrs {
            append_attr(&mut out, "", attr);
        }
        out.push(' ');
        out
    }
}

impl Handler for ContextHandler {
    fn enabled(&self, level: Level) -> bool {
        self.target.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<()> {
        self.target.handle(record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let target = self.target.with_attrs(attrs.clone());
        let mut tracked = self.attrs.clone();
        if let Some(Attr {
            value: Value::Group(children),
            ..
        }) = tracked.last_mut()
        {
            children.extend(attrs);
        } else {
            tracked.extend(attrs);
        }
        Arc::new(Self {
            target,
            attrs: tracked,
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let target = self.target.with_group(name);
        let mut tracked = self.attrs.clone();
        tracked.push(Attr::group(name, Vec::new()));
        Arc::new(Self {
            target,
            attrs: tracked,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Render the accumulated context of `logger`.
///
/// Degrades to [`FOREIGN_LOGGER_CONTEXT`] when the logger's handler is
/// not a [`ContextHandler`]; never an error or a panic.
pub fn context_string(logger: &Logger) -> String {
    match logger.handler().as_any().downcast_ref::<ContextHandler>() {
        Some(handler) => handler.context_string(),
        None => FOREIGN_LOGGER_CONTEXT.to_string(),
    }
}

fn append_attr(out: &mut String, prefix: &str, attr: &Attr) {
    let value = attr.value.resolve();
    if value.is_empty() {
        return;
    }
    match value {
        Value::Str(s) => {
            out.push_str(&format!("[{:?} = {:?}]", format!("{}{}", prefix, attr.key), s));
        }
        Value::Time(t) => {
            out.push_str(&format!(
                "[{:?}: {:?}]",
                format!("{}{}", prefix, attr.key),
                t.to_rfc3339_opts(SecondsFormat::Nanos, true)
            ));
        }
        Value::Group(children) => {
            if children.is_empty() {
                return;
            }
            let child_prefix = if attr.key.is_empty() {
                prefix.to_string()
            } else {
                format!("{}{}.", prefix, attr.key)
            };
            for child in &children {
                append_attr(out, &child_prefix, child);
            }
        }
        other => {
            out.push_str(&format!(
                "[{:?}: {}]",
                format!("{}{}", prefix, attr.key),
                other
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::LazyValue;
    use crate::handler::memory::MemoryHandler;
    use chrono::TimeZone;
    use chrono::Utc;

    fn tracked() -> Arc<dyn Handler> {
        Arc::new(ContextHandler::new(Arc::new(MemoryHandler::new())))
    }

    fn render(handler: &Arc<dyn Handler>) -> String {
        handler
            .as_any()
            .downcast_ref::<ContextHandler>()
            .expect("context handler")
            .context_string()
    }

    #[test]
    fn test_empty_context_renders_single_space() {
        assert_eq!(render(&tracked()), " ");
    }

    #[test]
    fn test_attrs_append_as_siblings() {
        let handler = tracked()
            .with_attrs(vec![Attr::str("a", "b")])
            .with_attrs(vec![Attr::str("c", "d")]);
        assert_eq!(render(&handler), "[\"a\" = \"b\"][\"c\" = \"d\"] ");
    }

    #[test]
    fn test_attrs_merge_into_open_group() {
        let handler = tracked()
            .with_group("req")
            .with_attrs(vec![Attr::str("id", "42")]);
        assert_eq!(render(&handler), "[\"req.id\" = \"42\"] ");
    }

    #[test]
    fn test_trailing_group_attr_also_absorbs() {
        // The open-group rule keys off the trailing element being a group,
        // however it got there.
        let handler = tracked()
            .with_attrs(vec![Attr::group("g", vec![Attr::str("a", "1")])])
            .with_attrs(vec![Attr::str("b", "2")]);
        assert_eq!(render(&handler), "[\"g.a\" = \"1\"][\"g.b\" = \"2\"] ");
    }

    #[test]
    fn test_second_group_closes_the_first() {
        let handler = tracked()
            .with_group("g0")
            .with_attrs(vec![Attr::str("a", "1")])
            .with_group("g1")
            .with_attrs(vec![Attr::str("b", "2")]);
        assert_eq!(render(&handler), "[\"g0.a\" = \"1\"][\"g1.b\" = \"2\"] ");
    }

    #[test]
    fn test_empty_group_renders_nothing() {
        let handler = tracked().with_group("lonely");
        assert_eq!(render(&handler), " ");
    }

    #[test]
    fn test_unnamed_group_adds_no_prefix_segment() {
        let handler = tracked().with_attrs(vec![Attr::group(
            "",
            vec![Attr::str("inner", "v")],
        )]);
        assert_eq!(render(&handler), "[\"inner\" = \"v\"] ");
    }

    #[test]
    fn test_time_attr_renders_quoted_rfc3339() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let handler = tracked().with_attrs(vec![Attr::time("at", t)]);
        assert_eq!(
            render(&handler),
            "[\"at\": \"2024-03-01T12:00:00.000000000Z\"] "
        );
    }

    #[test]
    fn test_other_kinds_render_unquoted() {
        let handler = tracked().with_attrs(vec![Attr::int("n", 7), Attr::bool("ok", true)]);
        assert_eq!(render(&handler), "[\"n\": 7][\"ok\": true] ");
    }

    #[test]
    fn test_keys_and_values_are_escaped() {
        let handler = tracked().with_attrs(vec![Attr::str("he said", "\"hi\"\n")]);
        assert_eq!(render(&handler), "[\"he said\" = \"\\\"hi\\\"\\n\"] ");
    }

    #[test]
    fn test_lazy_values_resolve_before_rendering() {
        #[derive(Debug)]
        struct Deferred;

        impl LazyValue for Deferred {
            fn resolve(&self) -> Value {
                Value::Str("late".to_string())
            }
        }

        let handler = tracked().with_attrs(vec![Attr::lazy("k", Deferred)]);
        assert_eq!(render(&handler), "[\"k\" = \"late\"] ");
    }

    #[test]
    fn test_empty_value_renders_nothing() {
        let handler = tracked().with_attrs(vec![
            Attr::new("gone", Value::Empty),
            Attr::str("kept", "v"),
        ]);
        assert_eq!(render(&handler), "[\"kept\" = \"v\"] ");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let handler = tracked()
            .with_group("g")
            .with_attrs(vec![Attr::str("a", "1")]);
        assert_eq!(render(&handler), render(&handler));
    }

    #[test]
    fn test_emission_does_not_change_context() {
        let handler = tracked().with_attrs(vec![Attr::str("a", "1")]);
        let before = render(&handler);
        handler
            .handle(&Record::new(Level::Info, "something happened"))
            .unwrap();
        assert_eq!(render(&handler), before);
    }

    #[test]
    fn test_enabled_delegates_to_target() {
        // MemoryHandler is always enabled, so the decorator must be too.
        let handler = tracked();
        assert!(handler.enabled(Level::Debug));
    }

    #[test]
    fn test_handle_forwards_to_target() {
        let base = MemoryHandler::new();
        let handler: Arc<dyn Handler> = Arc::new(ContextHandler::new(Arc::new(base.clone())));
        let handler = handler.with_attrs(vec![Attr::str("ctx", "v")]);
        handler
            .handle(&Record::new(Level::Warn, "passed through"))
            .unwrap();
        let records = base.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "passed through");
        // The base handler saw the derivation too, independently of the
        // decorator's shadow copy.
        assert_eq!(records[0].field("ctx"), Some("v"));
    }

    #[test]
    fn test_derivation_does_not_disturb_parent() {
        let parent = tracked().with_attrs(vec![Attr::str("a", "1")]);
        let before = render(&parent);
        let _left = parent.with_group("g").with_attrs(vec![Attr::str("b", "2")]);
        let _right = parent.with_attrs(vec![Attr::str("c", "3")]);
        assert_eq!(render(&parent), before);
    }
}
