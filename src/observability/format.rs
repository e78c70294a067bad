//! Entry formatters.
//!
//! # Formats
//! - `Json`: one object per line, `level` / `msg` / `time` plus every field
//! - `Text`: `time=... level=... msg=...` followed by sorted `key=value` pairs
//!
//! # Design Decisions
//! - User fields that collide with `level`, `msg` or `time` are kept under a
//!   `fields.` prefix instead of being dropped
//! - Text values are quoted only when they need it

use std::fmt::Write as _;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::observability::entry::{level_name, Entry};

const RESERVED: [&str; 3] = ["level", "msg", "time"];

/// Serialization strategy for entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

impl Format {
    /// Render an entry as one line, including the trailing newline.
    pub fn render(&self, entry: &Entry) -> String {
        match self {
            Format::Json => render_json(entry),
            Format::Text => render_text(entry),
        }
    }
}

fn timestamp(entry: &Entry) -> String {
    entry.time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn field_key(key: &str) -> String {
    if RESERVED.contains(&key) {
        format!("fields.{}", key)
    } else {
        key.to_string()
    }
}

fn render_json(entry: &Entry) -> String {
    let mut map = Map::new();
    for (key, value) in &entry.fields {
        map.insert(field_key(key), value.clone());
    }
    map.insert("level".into(), level_name(&entry.level).into());
    map.insert("msg".into(), entry.message.clone().into());
    map.insert("time".into(), timestamp(entry).into());

    let mut line = Value::Object(map).to_string();
    line.push('\n');
    line
}

fn render_text(entry: &Entry) -> String {
    let mut line = String::new();
    append_pair(&mut line, "time", &timestamp(entry));
    append_pair(&mut line, "level", level_name(&entry.level));
    if !entry.message.is_empty() {
        append_pair(&mut line, "msg", &entry.message);
    }

    for (key, value) in &entry.fields {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        append_pair(&mut line, &field_key(key), &value);
    }

    line.push('\n');
    line
}

fn append_pair(line: &mut String, key: &str, value: &str) {
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(key);
    line.push('=');
    if needs_quoting(value) {
        // Debug formatting escapes quotes and control characters.
        let _ = write!(line, "{:?}", value);
    } else {
        line.push_str(value);
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}
