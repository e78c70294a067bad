//! Log entries.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::Level;

/// Field map of an entry; keys are kept sorted.
pub type Fields = BTreeMap<String, Value>;

/// One log call, as seen by hooks and formatters.
#[derive(Debug, Clone)]
pub struct Entry {
    pub time: DateTime<Local>,
    pub level: Level,
    /// Module path of the call site (`tracing` target).
    pub target: String,
    pub message: String,
    pub fields: Fields,
    /// Source location of the `tracing` macro that produced the entry.
    pub callsite: Option<Callsite>,
}

/// Where an event was emitted, as recorded by `tracing` at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Callsite {
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Entry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            level,
            target: String::new(),
            message: message.into(),
            fields: Fields::new(),
            callsite: None,
        }
    }

    /// Build an entry from a `tracing` event.
    pub fn from_event(event: &tracing::Event<'_>) -> Self {
        let meta = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        Self {
            time: Local::now(),
            level: *meta.level(),
            target: meta.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            callsite: Some(Callsite {
                module_path: meta.module_path().map(str::to_string),
                file: meta.file().map(str::to_string),
                line: meta.line(),
            }),
        }
    }

    /// Set a field, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
}

/// Lowercase level name used by both formatters; warn is spelled `warning`
/// so existing log consumers keep matching.
pub fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warning",
        _ => "error",
    }
}

/// Collects `tracing` fields into JSON values. The `message` field becomes
/// the entry message.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Fields,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.put(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value).into());
    }
}
