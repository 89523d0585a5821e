//! Dispatch of bus messages to sinks.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::bus::Message;
use crate::codec::EventCodec;
use crate::error::DispatchError;
use crate::sinks::Sink;

/// Something that consumes bus messages.
pub trait MessageHandler: Send + Sync {
    /// Handle one message. `None` stands for a delivery with no message.
    ///
    /// Handlers absorb their own failures; nothing is returned to the bus.
    fn handle(&self, message: Option<&Message>);
}

impl<H: MessageHandler + ?Sized> MessageHandler for Arc<H> {
    fn handle(&self, message: Option<&Message>) {
        (**self).handle(message)
    }
}

/// Decodes message bodies into events and fans them out to sinks.
///
/// Sinks are invoked in the order given, on the calling thread. The first
/// sink that fails stops the fan-out: sinks before it keep what they
/// recorded and sinks after it never see the event.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use metricsbus_sdk::{ChannelSink, Message, MessageHandler, Sink, SinkHandler};
///
/// let (sink, mut rx) = ChannelSink::channel(4);
/// let handler = SinkHandler::new(vec![Arc::new(sink) as Arc<dyn Sink>]);
///
/// let body = r#"{"annotations":{},"timerSamples":{},"counterSamples":{},"gaugeSamples":{}}"#;
/// handler.handle(Some(&Message::with_body("metrics.sink.default", body)));
///
/// assert!(rx.try_recv().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct SinkHandler {
    sinks: Arc<[Arc<dyn Sink>]>,
    codec: EventCodec,
}

impl SinkHandler {
    /// Create a handler over `sinks` with the default codec.
    pub fn new(sinks: impl Into<Arc<[Arc<dyn Sink>]>>) -> Self {
        Self::with_codec(sinks, EventCodec::new())
    }

    /// Create a handler over `sinks` decoding with `codec`.
    pub fn with_codec(sinks: impl Into<Arc<[Arc<dyn Sink>]>>, codec: EventCodec) -> Self {
        Self {
            sinks: sinks.into(),
            codec,
        }
    }

    /// The configured sinks, in invocation order.
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Decode `body` and record the event to every sink.
    ///
    /// Unlike [`MessageHandler::handle`], errors are returned so callers can
    /// build on this, for example to reply once all sinks succeeded.
    pub fn process_message(&self, body: &str) -> Result<(), DispatchError> {
        let event = self.codec.decode(body)?;
        for sink in self.sinks.iter() {
            sink.record(&event).map_err(|source| DispatchError::Sink {
                sink: sink.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl MessageHandler for SinkHandler {
    fn handle(&self, message: Option<&Message>) {
        let Some(message) = message else {
            debug!("Ignoring missing message");
            return;
        };
        let Some(body) = message.body() else {
            debug!(address = %message.address(), "Ignoring message without body");
            return;
        };

        match self.process_message(body) {
            Ok(()) => {}
            Err(DispatchError::Decode(e)) => {
                warn!(address = %message.address(), error = %e, "Failed to decode event");
            }
            Err(e) => {
                warn!(address = %message.address(), error = %e, "Failed to record event");
            }
        }
    }
}

impl fmt::Debug for SinkHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sinks.iter().map(|sink| sink.name()).collect();
        f.debug_struct("SinkHandler")
            .field("sinks", &names)
            .field("codec", &self.codec)
            .finish()
    }
}
