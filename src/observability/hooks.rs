//! Entry hooks.
//!
//! Hooks run synchronously, in registration order, on every entry whose
//! level they subscribe to. Each hook may add or overwrite fields.

use tracing::Level;

use crate::observability::entry::Entry;

/// Every level, most severe first.
pub const ALL_LEVELS: [Level; 5] = [
    Level::ERROR,
    Level::WARN,
    Level::INFO,
    Level::DEBUG,
    Level::TRACE,
];

/// Interceptor invoked before an entry is formatted.
pub trait Hook: Send + Sync {
    /// Stable name, used to inspect a logger's hook list.
    fn name(&self) -> &'static str;

    /// Levels this hook fires on.
    fn levels(&self) -> &[Level] {
        &ALL_LEVELS
    }

    fn fire(&self, entry: &mut Entry);
}

/// Adapter turning a closure into a [`Hook`].
pub struct FnHook<F> {
    name: &'static str,
    levels: Vec<Level>,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&mut Entry) + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self {
            name,
            levels: ALL_LEVELS.to_vec(),
            f,
        }
    }

    /// Restrict the hook to the given levels.
    pub fn on_levels(mut self, levels: &[Level]) -> Self {
        self.levels = levels.to_vec();
        self
    }
}

impl<F> Hook for FnHook<F>
where
    F: Fn(&mut Entry) + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn fire(&self, entry: &mut Entry) {
        (self.f)(entry)
    }
}
