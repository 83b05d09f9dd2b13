use super::Handler;
use crate::attr::{Attr, Value};
use crate::error::Result;
use crate::model::{Level, Record};
use chrono::SecondsFormat;
use serde_json::{Map, Value as JsonValue};
use std::any::Any;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Base handler writing one JSON object per record.
///
/// Groups become nested objects; a duplicate key at the same nesting level
/// resolves last-wins. Timestamps serialize as RFC 3339 strings with
/// nanoseconds.
pub struct JsonHandler<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    min_level: Level,
    // Accumulated attributes, already nested into their group objects
    base: Map<String, JsonValue>,
    // Names of the groups currently open for future attributes
    groups: Vec<String>,
}

impl<W: Write + Send> JsonHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            min_level: Level::Info,
            base: Map::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

impl JsonHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

/// Insert `attrs` into the object reached by descending `groups` from
/// `map`, creating intermediate objects as needed. A non-object value in
/// the way is replaced.
fn insert_at(map: &mut Map<String, JsonValue>, groups: &[String], attrs: &[Attr]) {
    match groups.split_first() {
        None => insert_attrs(map, attrs),
        Some((head, rest)) => {
            let mut child = match map.remove(head.as_str()) {
                Some(JsonValue::Object(existing)) => existing,
                _ => Map::new(),
            };
            insert_at(&mut child, rest, attrs);
            map.insert(head.clone(), JsonValue::Object(child));
        }
    }
}

fn insert_attrs(map: &mut Map<String, JsonValue>, attrs: &[Attr]) {
    for attr in attrs {
        match attr.value.resolve() {
            Value::Empty => {}
            // resolve() never settles on Lazy
            Value::Lazy(_) => {}
            Value::Group(children) => {
                if children.is_empty() {
                    continue;
                }
                if attr.key.is_empty() {
                    insert_attrs(map, &children);
                } else {
                    let mut child = match map.remove(attr.key.as_str()) {
                        Some(JsonValue::Object(existing)) => existing,
                        _ => Map::new(),
                    };
                    insert_attrs(&mut child, &children);
                    map.insert(attr.key.clone(), JsonValue::Object(child));
                }
            }
            Value::Str(s) => {
                map.insert(attr.key.clone(), JsonValue::String(s));
            }
            Value::Bool(b) => {
                map.insert(attr.key.clone(), JsonValue::Bool(b));
            }
            Value::Int(i) => {
                map.insert(attr.key.clone(), JsonValue::from(i));
            }
            Value::Uint(u) => {
                map.insert(attr.key.clone(), JsonValue::from(u));
            }
            Value::Float(x) => {
                // NaN and infinities have no JSON form and become null
                map.insert(attr.key.clone(), JsonValue::from(x));
            }
            Value::Time(t) => {
                map.insert(
                    attr.key.clone(),
                    JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Nanos, true)),
                );
            }
        }
    }
}

impl<W: Write + Send + 'static> Handler for JsonHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn handle(&self, record: &Record) -> Result<()> {
        let mut out = Map::new();
        out.insert(
            "time".to_string(),
            JsonValue::String(record.time.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        out.insert(
            "level".to_string(),
            JsonValue::String(record.level.to_string()),
        );
        out.insert(
            "msg".to_string(),
            JsonValue::String(record.message.clone()),
        );
        for (key, value) in self.base.clone() {
            out.insert(key, value);
        }
        if !record.attrs.is_empty() {
            insert_at(&mut out, &self.groups, &record.attrs);
        }

        let line = serde_json::to_string(&JsonValue::Object(out))?;
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let mut base = self.base.clone();
        if !attrs.is_empty() {
            insert_at(&mut base, &self.groups, &attrs);
        }
        Arc::new(Self {
            writer: Arc::clone(&self.writer),
            min_level: self.min_level,
            base,
            groups: self.groups.clone(),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let mut groups = self.groups.clone();
        if !name.is_empty() {
            groups.push(name.to_string());
        }
        Arc::new(Self {
            writer: Arc::clone(&self.writer),
            min_level: self.min_level,
            base: self.base.clone(),
            groups,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
