//! Attribute types carried by loggers and records.
//!
//! An [`Attr`] is a key/value pair; a [`Value`] is one of a closed set of
//! kinds. Groups make the model a tree: a group's value is an ordered list
//! of child attributes, and groups nest to arbitrary depth. Lazy values
//! defer computation until a handler or the context renderer actually
//! needs them, and are always passed through [`Value::resolve`] first.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;

/// How many chained lazy values `resolve` will follow before giving up.
const MAX_RESOLVE_DEPTH: usize = 100;

/// A deferred value, computed when a handler first needs it.
///
/// Implementations may themselves return another lazy value; resolution
/// is bounded by an internal depth limit.
pub trait LazyValue: fmt::Debug + Send + Sync {
    fn resolve(&self) -> Value;
}

/// Runtime representation of an attribute value.
#[derive(Debug, Clone)]
pub enum Value {
    /// No value. Attributes resolving to this render as nothing.
    Empty,

    /// Text value
    Str(String),

    /// Boolean value
    Bool(bool),

    /// Signed integer value
    Int(i64),

    /// Unsigned integer value
    Uint(u64),

    /// Floating point value
    Float(f64),

    /// Timestamp value, rendered as RFC 3339 with nanoseconds
    Time(DateTime<Utc>),

    /// Ordered child attributes under a common (possibly empty) name
    Group(Vec<Attr>),

    /// Deferred value, computed on demand
    Lazy(Arc<dyn LazyValue>),
}

impl Value {
    /// Chase lazy values until a settled kind comes back.
    ///
    /// A chain that never settles within the depth limit resolves to
    /// [`Value::Empty`], which consumers skip.
    pub fn resolve(&self) -> Value {
        let mut value = self.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match value {
                Value::Lazy(source) => value = source.resolve(),
                settled => return settled,
            }
        }
        Value::Empty
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }

    /// Get the string value if this is a Str.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the child attributes if this is a Group.
    pub fn as_group(&self) -> Option<&[Attr]> {
        match self {
            Value::Group(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Get the timestamp if this is a Time.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// The default textual form, used wherever a value is rendered
    /// outside the string/time special cases.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
            Value::Lazy(_) => write!(f, "{}", self.resolve()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(value: Vec<Attr>) -> Self {
        Value::Group(value)
    }
}

/// A named value unit in the logging context.
///
/// Immutable once constructed; derivation paths clone rather than mutate.
#[derive(Debug, Clone)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn str(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::Str(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(value))
    }

    /// A named bundle of child attributes. An empty `key` makes the group
    /// transparent: children render without an added prefix segment.
    pub fn group(key: impl Into<String>, children: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(children))
    }

    pub fn lazy(key: impl Into<String>, source: impl LazyValue + 'static) -> Self {
        Self::new(key, Value::Lazy(Arc::new(source)))
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}
