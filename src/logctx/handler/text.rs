use super::{flatten_attrs, Handler};
use crate::attr::{Attr, Value};
use crate::error::Result;
use crate::model::{Level, Record};
use chrono::SecondsFormat;
use std::any::Any;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Base handler writing one `key=value` line per record.
///
/// Output shape: `time=<rfc3339> level=<LEVEL> msg=<msg> <k>=<v>...`, with
/// attributes accumulated through derivation before the per-call ones.
/// Group membership shows up as dotted key prefixes. Keys and values that
/// contain spaces, quotes, or `=` are quoted.
pub struct TextHandler<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    min_level: Level,
    // Accumulated attributes, flattened and key-prefixed at derivation time
    fields: Vec<(String, Value)>,
    // Names of the groups currently open for future attributes
    groups: Vec<String>,
}

impl<W: Write + Send> TextHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            min_level: Level::Info,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    fn group_prefix(&self) -> String {
        if self.groups.is_empty() {
            String::new()
        } else {
            format!("{}.", self.groups.join("."))
        }
    }
}

impl TextHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

/// Quote a token when raw output would be ambiguous.
fn text_token(s: &str) -> String {
    if s.is_empty() || s.contains([' ', '"', '=']) || s.contains(char::is_control) {
        format!("{:?}", s)
    } else {
        s.to_string()
    }
}

fn push_field(line: &mut String, key: &str, value: &Value) {
    line.push(' ');
    line.push_str(&text_token(key));
    line.push('=');
    line.push_str(&text_token(&value.to_string()));
}

impl<W: Write + Send + 'static> Handler for TextHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn handle(&self, record: &Record) -> Result<()> {
        let mut line = format!(
            "time={} level={} msg={}",
            record.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            record.level,
            text_token(&record.message),
        );
        for (key, value) in &self.fields {
            push_field(&mut line, key, value);
        }
        let mut call_fields = Vec::new();
        flatten_attrs(&mut call_fields, &self.group_prefix(), &record.attrs);
        for (key, value) in &call_fields {
            push_field(&mut line, key, value);
        }
        line.push('\n');

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let mut fields = self.fields.clone();
        flatten_attrs(&mut fields, &self.group_prefix(), &attrs);
        Arc::new(Self {
            writer: Arc::clone(&self.writer),
            min_level: self.min_level,
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
            writer: Arc::clone(&self.writer),
            min_level: self.min_level,
            fields: self.fields.clone(),
            groups,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
