//! Call-site attribution.
//!
//! # Responsibilities
//! - Find the first stack frame outside the logging stack
//! - Annotate entries with its `file`, `func` and `line`
//!
//! # Design Decisions
//! - Frames are excluded by name, not by position, so extra wrapper layers
//!   between the application and the hook do not shift attribution
//! - The search is bounded by a capture window and stops at the first match
//! - Frame search is a pure function over [`Frame`]s; live capture is separate

use std::path::{Path, PathBuf};

use crate::observability::entry::Entry;
use crate::observability::hooks::Hook;

/// Name reported by [`CallerLocator`] as a hook.
pub const CALLER_HOOK: &str = "caller";

/// Maximum frames inspected by the default locator.
pub const DEFAULT_CAPTURE: usize = 64;

/// Path prefixes of the logging stack itself.
pub const DEFAULT_INTERNAL_MARKERS: [&str; 8] = [
    "_Unwind_",
    "backtrace::",
    "core::ops::function::",
    "std::thread::local::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
    "turbo_log::observability::",
];

/// Path prefixes of the Rust runtime. Reaching one of these means the walk
/// has left application code, so the search ends there.
pub const RUNTIME_BOUNDARIES: [&str; 5] = [
    "__rust_",
    "std::panic::",
    "std::panicking::",
    "std::rt::",
    "std::sys::",
];

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Fully qualified function name; empty when unresolved.
    pub function: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: Some(file.into()),
            line: Some(line),
        }
    }
}

/// Attribution extracted from a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Final component of the source file path.
    pub file: String,
    /// Final segment of the function path.
    pub func: String,
    pub line: u32,
}

impl Caller {
    fn from_frame(frame: &Frame) -> Self {
        Self {
            file: frame.file.as_deref().map(base_file_name).unwrap_or_default(),
            func: function_base_name(&frame.function).to_string(),
            line: frame.line.unwrap_or(0),
        }
    }
}

fn base_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find the first frame, innermost first, that is not internal.
///
/// The first `skip` frames are ignored and at most `capture` frames after
/// them are inspected. Unresolved frames (empty name) never qualify.
pub fn locate_caller<'a, I, P>(frames: I, skip: usize, capture: usize, is_internal: P) -> Option<Caller>
where
    I: IntoIterator<Item = &'a Frame>,
    P: Fn(&str) -> bool,
{
    frames
        .into_iter()
        .skip(skip)
        .take(capture)
        .find(|frame| !frame.function.is_empty() && !is_internal(&frame.function))
        .map(Caller::from_frame)
}

/// Last path segment of a function name, ignoring closure segments and a
/// trailing symbol hash.
pub fn function_base_name(name: &str) -> &str {
    let mut segments = name.rsplit("::").peekable();
    if let Some(last) = segments.peek() {
        if is_symbol_hash(last) {
            segments.next();
        }
    }
    segments
        .find(|seg| !seg.is_empty() && *seg != "{{closure}}")
        .unwrap_or(name)
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Whether `name` has a path starting with `prefix`: at the start of the
/// name, or right after `<`, `&` or a space as in `<A as B>::f`. A prefix
/// after `::` is an inner module of another path and does not count.
fn has_path_prefix(name: &str, prefix: &str) -> bool {
    name.match_indices(prefix).any(|(idx, _)| {
        name[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| matches!(c, '<' | '&' | ' '))
    })
}

pub fn is_runtime(function: &str) -> bool {
    RUNTIME_BOUNDARIES.iter().any(|prefix| has_path_prefix(function, prefix))
}

/// Hook adding `file`, `func` and `line` of the calling application frame.
#[derive(Debug, Clone)]
pub struct CallerLocator {
    skip: usize,
    capture: usize,
    markers: Vec<String>,
}

impl Default for CallerLocator {
    fn default() -> Self {
        Self::new(0, DEFAULT_CAPTURE, DEFAULT_INTERNAL_MARKERS)
    }
}

impl CallerLocator {
    pub fn new<I, S>(skip: usize, capture: usize, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip,
            capture,
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a marker for another crate that wraps the logger.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn is_internal(&self, function: &str) -> bool {
        self.markers.iter().any(|marker| has_path_prefix(function, marker))
    }

    /// Search `frames`, innermost first, up to the first runtime frame.
    pub fn locate(&self, frames: &[Frame]) -> Option<Caller> {
        let end = frames
            .iter()
            .position(|frame| is_runtime(&frame.function))
            .unwrap_or(frames.len());
        locate_caller(&frames[..end], self.skip, self.capture, |name| self.is_internal(name))
    }

    /// Fill `file`, `func` and `line` from frames returned by [`Self::capture`].
    ///
    /// The function comes from the stack. File and line come from the
    /// entry's callsite when the event was emitted by application code, since
    /// the frame's own location points into the expanded `tracing` macro.
    pub fn attribute(&self, entry: &mut Entry, frames: &[Frame]) {
        let Some(mut caller) = locate_caller(
            frames.iter().take_while(|frame| !is_runtime(&frame.function)),
            0,
            self.capture,
            |name| self.is_internal(name),
        ) else {
            return;
        };

        let site = entry.callsite.as_ref().filter(|site| {
            site.module_path
                .as_deref()
                .map_or(true, |module| !self.is_internal(&format!("{}::", module)))
        });
        if let Some(site) = site {
            if let Some(file) = site.file.as_deref() {
                caller.file = base_file_name(Path::new(file));
            }
            if let Some(line) = site.line {
                caller.line = line;
            }
        }

        entry.insert("file", caller.file);
        entry.insert("func", caller.func);
        entry.insert("line", caller.line);
    }

    /// Capture the current stack, stopping after the first application frame.
    #[inline(never)]
    pub fn capture(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut skipped = 0usize;
        let mut done = false;

        backtrace::trace(|raw| {
            backtrace::resolve_frame(raw, |symbol| {
                if done {
                    return;
                }
                if skipped < self.skip {
                    skipped += 1;
                    return;
                }

                let frame = Frame {
                    function: symbol.name().map(|n| format!("{:#}", n)).unwrap_or_default(),
                    file: symbol.filename().map(Path::to_path_buf),
                    line: symbol.lineno(),
                };
                let stop = is_runtime(&frame.function)
                    || (!frame.function.is_empty() && !self.is_internal(&frame.function));
                frames.push(frame);

                if stop || frames.len() >= self.capture {
                    done = true;
                }
            });
            !done
        });

        frames
    }
}

impl Hook for CallerLocator {
    fn name(&self) -> &'static str {
        CALLER_HOOK
    }

    fn fire(&self, entry: &mut Entry) {
        let frames = self.capture();
        self.attribute(entry, &frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::entry::Callsite;
    use tracing::Level;

    fn library_frames() -> Vec<Frame> {
        vec![
            Frame::new("backtrace::backtrace::libunwind::trace", "libunwind.rs", 93),
            Frame::new("turbo_log::observability::caller::CallerLocator::capture", "caller.rs", 160),
            Frame::new(
                "<tracing_subscriber::layer::layered::Layered<L,S> as tracing_core::subscriber::Subscriber>::event",
                "layered.rs",
                153,
            ),
            Frame::new("tracing_core::event::Event::dispatch::{{closure}}", "event.rs", 35),
        ]
    }

    #[test]
    fn test_returns_first_application_frame() {
        let mut frames = library_frames();
        frames.push(Frame::new("billing::invoice::render", "/src/billing/src/invoice.rs", 42));
        frames.push(Frame::new("billing::main", "/src/billing/src/main.rs", 7));

        let caller = CallerLocator::default().locate(&frames).unwrap();
        assert_eq!(
            caller,
            Caller {
                file: "invoice.rs".into(),
                func: "render".into(),
                line: 42,
            }
        );
    }

    #[test]
    fn test_only_library_frames_is_not_found() {
        assert_eq!(CallerLocator::default().locate(&library_frames()), None);

        let mut entry = Entry::new(Level::INFO, "x");
        CallerLocator::default().attribute(&mut entry, &library_frames());
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_fire_without_application_frame_adds_nothing() {
        // A one-frame window only ever sees the unwinder.
        let locator = CallerLocator::new(0, 1, DEFAULT_INTERNAL_MARKERS);
        let mut entry = Entry::new(Level::INFO, "x").with_field("order", 1);
        locator.fire(&mut entry);

        assert_eq!(entry.fields.len(), 1);
        assert!(entry.fields.get("file").is_none());
    }

    #[test]
    fn test_binary_main_is_application_code() {
        let mut frames = library_frames();
        frames.push(Frame::new("turbo_log::main", "/src/turbo-log/src/main.rs", 58));
        frames.push(Frame::new("core::ops::function::FnOnce::call_once", "function.rs", 250));
        frames.push(Frame::new("std::sys::backtrace::__rust_begin_short_backtrace", "backtrace.rs", 152));
        frames.push(Frame::new("std::rt::lang_start::{{closure}}", "rt.rs", 206));

        let caller = CallerLocator::default().locate(&frames).unwrap();
        assert_eq!(caller.func, "main");
        assert_eq!(caller.file, "main.rs");
    }

    #[test]
    fn test_runtime_frames_never_qualify() {
        let mut frames = library_frames();
        frames.push(Frame::new("std::sys::backtrace::__rust_begin_short_backtrace", "backtrace.rs", 152));
        frames.push(Frame::new("std::rt::lang_start_internal", "rt.rs", 175));
        frames.push(Frame::new("main", "", 0));

        assert_eq!(CallerLocator::default().locate(&frames), None);

        let mut entry = Entry::new(Level::INFO, "x");
        CallerLocator::default().attribute(&mut entry, &frames);
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_app_module_named_like_a_library() {
        let mut frames = library_frames();
        frames.push(Frame::new("app::observability::tracing::emit_order", "tracing.rs", 12));
        frames.push(Frame::new("app::backtrace::capture_all", "backtrace.rs", 4));

        let caller = CallerLocator::default().locate(&frames).unwrap();
        assert_eq!(caller.func, "emit_order");
    }

    #[test]
    fn test_callsite_overrides_frame_location() {
        let mut frames = library_frames();
        frames.push(Frame::new("billing::invoice::render", "/cargo/tracing-0.1.41/src/macros.rs", 905));

        let mut entry = Entry::new(Level::INFO, "x");
        entry.callsite = Some(Callsite {
            module_path: Some("billing::invoice".into()),
            file: Some("src/invoice.rs".into()),
            line: Some(42),
        });
        CallerLocator::default().attribute(&mut entry, &frames);

        assert_eq!(entry.fields["file"], "invoice.rs");
        assert_eq!(entry.fields["func"], "render");
        assert_eq!(entry.fields["line"], 42);
    }

    #[test]
    fn test_internal_callsite_keeps_frame_location() {
        let mut frames = library_frames();
        frames.push(Frame::new("turbo_log::lifecycle::startup::init_logging_or_exit", "src/lifecycle/startup.rs", 24));

        let mut entry = Entry::new(Level::INFO, "Logging initialized");
        entry.callsite = Some(Callsite {
            module_path: Some("turbo_log::observability::logging".into()),
            file: Some("src/observability/logging.rs".into()),
            line: Some(74),
        });
        CallerLocator::default().attribute(&mut entry, &frames);

        assert_eq!(entry.fields["file"], "startup.rs");
        assert_eq!(entry.fields["func"], "init_logging_or_exit");
        assert_eq!(entry.fields["line"], 24);
    }

    #[test]
    fn test_window_bounds_search() {
        let mut frames = library_frames();
        frames.push(Frame::new("app::run", "main.rs", 3));

        let internal = |name: &str| CallerLocator::default().is_internal(name);
        assert!(locate_caller(&frames, 0, 4, internal).is_none());
        assert!(locate_caller(&frames, 0, 5, internal).is_some());
        assert!(locate_caller(&frames, 2, 3, internal).is_some());
    }

    #[test]
    fn test_skip_is_positional() {
        let frames = vec![
            Frame::new("app::inner", "a.rs", 1),
            Frame::new("app::outer", "b.rs", 2),
        ];
        let caller = locate_caller(&frames, 1, 3, |_| false).unwrap();
        assert_eq!(caller.func, "outer");
    }

    #[test]
    fn test_unresolved_frames_are_skipped() {
        let frames = vec![Frame::default(), Frame::new("app::run", "main.rs", 9)];
        let caller = locate_caller(&frames, 0, 3, |_| false).unwrap();
        assert_eq!(caller.line, 9);
    }

    #[test]
    fn test_function_base_name() {
        assert_eq!(function_base_name("app::handlers::create"), "create");
        assert_eq!(function_base_name("app::run::{{closure}}"), "run");
        assert_eq!(function_base_name("app::run::{{closure}}::{{closure}}"), "run");
        assert_eq!(function_base_name("app::run::h0123456789abcdef"), "run");
        assert_eq!(function_base_name("<app::Svc as app::Handler>::call"), "call");
        assert_eq!(function_base_name("main"), "main");
    }

    #[test]
    fn test_markers_match_on_path_boundary() {
        let locator = CallerLocator::default();
        assert!(locator.is_internal("tracing::span::Span::enter"));
        assert!(locator.is_internal("<turbo_log::observability::layer::LoggerLayer as tracing_subscriber::layer::Layer<S>>::on_event"));
        assert!(!locator.is_internal("my_tracing::emit"));
        assert!(!locator.is_internal("app::tracing_helpers::emit"));
        assert!(!locator.is_internal("app::observability::tracing::emit"));
        assert!(!locator.is_internal("turbo_log::main"));
        assert!(locator.is_internal("<&mut tracing::Span as app::Enter>::enter"));
    }

    #[test]
    fn test_extra_marker() {
        let locator = CallerLocator::default().with_marker("app_log::");
        assert!(locator.is_internal("app_log::wrap::info"));
    }

    #[test]
    fn test_live_capture_is_bounded() {
        let locator = CallerLocator::new(0, 2, ["turbo_log::"]);
        assert!(locator.capture().len() <= 2);
    }

    #[test]
    fn test_hook_name() {
        assert_eq!(CallerLocator::default().name(), CALLER_HOOK);
    }
}
