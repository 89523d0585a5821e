//! Event sinks.
//!
//! A [`Sink`] is anything that can take a decoded [`Event`]. The handler
//! calls every configured sink in order for each event it decodes.

mod event_bus;
mod file;
mod log;

#[cfg(feature = "tokio")]
mod channel;

pub use event_bus::{EventBusSink, EventBusSinkBuilder};
pub use file::FileSink;
pub use log::LogSink;

#[cfg(feature = "tokio")]
pub use channel::ChannelSink;

use std::sync::Arc;

use metricsbus_types::Event;

use crate::error::SinkError;

/// A destination for events.
///
/// Implementations must be safe to call from several threads at once.
pub trait Sink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &Event) -> Result<(), SinkError>;

    /// Name used when reporting failures from this sink.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        (**self).record(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        (**self).record(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
