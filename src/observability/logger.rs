//! The shared logger.
//!
//! A [`Logger`] is a cheap handle; clones share one level, one hook list and
//! one sink. Level and hooks are fixed at build time. The sink (format plus
//! destination) can be replaced at any time with [`Logger::set_output`].

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::level_filters::LevelFilter;

use crate::observability::entry::Entry;
use crate::observability::format::Format;
use crate::observability::hooks::Hook;
use crate::observability::layer::LoggerLayer;

type Writer = Box<dyn Write + Send>;

/// Format and destination, swapped together.
struct Sink {
    format: Format,
    writer: Mutex<Writer>,
}

struct Inner {
    level: LevelFilter,
    hooks: Vec<Arc<dyn Hook>>,
    sink: ArcSwap<Sink>,
}

/// Handle to a configured logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.inner.level)
            .field("format", &self.format())
            .field("hooks", &self.hook_names())
            .finish()
    }
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Minimum level; anything more verbose is dropped.
    pub fn level(&self) -> LevelFilter {
        self.inner.level
    }

    pub fn format(&self) -> Format {
        self.inner.sink.load().format
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.inner.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn has_hook(&self, name: &str) -> bool {
        self.inner.hooks.iter().any(|hook| hook.name() == name)
    }

    pub fn enabled(&self, level: &tracing::Level) -> bool {
        *level <= self.inner.level
    }

    /// Replace the destination and switch to text formatting.
    ///
    /// Takes effect from the next entry. Level and hooks are left alone.
    pub fn set_output<W>(&self, writer: W)
    where
        W: Write + Send + 'static,
    {
        self.inner.sink.store(Arc::new(Sink {
            format: Format::Text,
            writer: Mutex::new(Box::new(writer)),
        }));
    }

    /// `tracing` layer feeding events into this logger.
    pub fn layer(&self) -> LoggerLayer {
        LoggerLayer::new(self.clone())
    }

    /// Run hooks, format and write one entry.
    pub fn emit(&self, mut entry: Entry) {
        if !self.enabled(&entry.level) {
            return;
        }

        for hook in &self.inner.hooks {
            if hook.levels().contains(&entry.level) {
                hook.fire(&mut entry);
            }
        }

        let sink = self.inner.sink.load();
        let line = sink.format.render(&entry);
        let result = match sink.writer.lock() {
            Ok(mut writer) => writer.write_all(line.as_bytes()).and_then(|_| writer.flush()),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log writer mutex poisoned")),
        };

        if let Err(e) = result {
            let _ = writeln!(io::stderr(), "Failed to write to log, {}", e);
        }
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    level: LevelFilter,
    format: Format,
    writer: Writer,
    hooks: Vec<Arc<dyn Hook>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: Format::Text,
            writer: Box::new(io::stderr()),
            hooks: Vec::new(),
        }
    }
}

impl LoggerBuilder {
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn output<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.writer = Box::new(writer);
        self
    }

    /// Append a hook; hooks fire in the order they were added.
    pub fn hook<H>(mut self, hook: H) -> Self
    where
        H: Hook + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            inner: Arc::new(Inner {
                level: self.level,
                hooks: self.hooks,
                sink: ArcSwap::from_pointee(Sink {
                    format: self.format,
                    writer: Mutex::new(self.writer),
                }),
            }),
        }
    }
}
