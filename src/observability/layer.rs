//! `tracing` integration.

use tracing::level_filters::LevelFilter;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::observability::entry::Entry;
use crate::observability::logger::Logger;

/// Layer that turns `tracing` events into entries of a [`Logger`].
///
/// Events below the logger's level are rejected in `enabled`, so they are
/// never recorded, hooked or formatted.
pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.logger.enabled(metadata.level())
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(self.logger.level())
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.logger.emit(Entry::from_event(event));
    }
}
