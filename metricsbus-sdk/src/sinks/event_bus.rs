//! Sink that republishes events onto the bus.

use std::fmt;
use std::sync::Arc;

use metricsbus_types::Event;
use tracing::{debug, warn};

use super::Sink;
use crate::bus::{EventBus, DEFAULT_SINK_ADDRESS};
use crate::codec::EventCodec;
use crate::error::{ConfigurationError, SinkError};

/// Publishes each event as JSON text to a bus address.
///
/// This is the producer side of the system: whatever handler is subscribed
/// to the address receives the encoded event.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use metricsbus_sdk::{Event, EventBusSink, LocalBus, Sink};
///
/// let bus = LocalBus::new();
/// let mut subscription = bus.subscribe("metrics.sink.default");
///
/// let sink = EventBusSink::builder()
///     .event_bus(Arc::new(bus.clone()))
///     .build()
///     .unwrap();
///
/// sink.record(&Event::default()).unwrap();
/// assert!(subscription.try_recv().is_some());
/// ```
pub struct EventBusSink {
    event_bus: Arc<dyn EventBus>,
    sink_address: String,
    codec: EventCodec,
}

impl EventBusSink {
    /// Create a builder.
    pub fn builder() -> EventBusSinkBuilder {
        EventBusSinkBuilder::new()
    }

    /// The address events are published to.
    pub fn sink_address(&self) -> &str {
        &self.sink_address
    }
}

impl Sink for EventBusSink {
    /// Encode and publish the event.
    ///
    /// An event that cannot be encoded is logged and dropped; the call still
    /// succeeds.
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        match self.codec.encode(event) {
            Ok(body) => {
                debug!(address = %self.sink_address, "Sending event to sink");
                self.event_bus.publish(&self.sink_address, body);
            }
            Err(e) => {
                warn!(address = %self.sink_address, error = %e, "Failed to encode event");
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "event-bus"
    }
}

impl fmt::Debug for EventBusSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusSink")
            .field("event_bus", &self.event_bus)
            .field("sink_address", &self.sink_address)
            .finish()
    }
}

/// Builder for [`EventBusSink`].
#[derive(Debug)]
pub struct EventBusSinkBuilder {
    event_bus: Option<Arc<dyn EventBus>>,
    sink_address: String,
    codec: EventCodec,
}

impl EventBusSinkBuilder {
    /// Create a builder with the default address and codec.
    pub fn new() -> Self {
        Self {
            event_bus: None,
            sink_address: DEFAULT_SINK_ADDRESS.to_string(),
            codec: EventCodec::new(),
        }
    }

    /// Set the bus to publish on. Required.
    pub fn event_bus(mut self, event_bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Set the address to publish to.
    ///
    /// Defaults to [`DEFAULT_SINK_ADDRESS`].
    pub fn sink_address(mut self, sink_address: impl Into<String>) -> Self {
        self.sink_address = sink_address.into();
        self
    }

    /// Set the codec used to encode events.
    pub fn codec(mut self, codec: EventCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Build the sink.
    ///
    /// Fails if no bus was set or the address is empty.
    pub fn build(self) -> Result<EventBusSink, ConfigurationError> {
        let event_bus = self.event_bus.ok_or(ConfigurationError::MissingEventBus)?;
        if self.sink_address.is_empty() {
            return Err(ConfigurationError::EmptyAddress);
        }

        Ok(EventBusSink {
            event_bus,
            sink_address: self.sink_address,
            codec: self.codec,
        })
    }
}

impl Default for EventBusSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricsbus_types::{units, Quantity};

    #[derive(Debug, Default)]
    struct RecordingBus {
        published: parking_lot::Mutex<Vec<(String, String)>>,
    }

    impl EventBus for RecordingBus {
        fn publish(&self, address: &str, body: String) {
            self.published.lock().push((address.to_string(), body));
        }
    }

    #[test]
    fn test_build_requires_event_bus() {
        let err = EventBusSink::builder().build().unwrap_err();
        assert_eq!(err, ConfigurationError::MissingEventBus);
        assert_eq!(err.to_string(), "EventBus cannot be missing");
    }

    #[test]
    fn test_build_rejects_empty_address() {
        let err = EventBusSink::builder()
            .event_bus(Arc::new(RecordingBus::default()))
            .sink_address("")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyAddress);
        assert_eq!(err.to_string(), "Sink address cannot be empty");
    }

    #[test]
    fn test_default_address() {
        let sink = EventBusSink::builder()
            .event_bus(Arc::new(RecordingBus::default()))
            .build()
            .unwrap();
        assert_eq!(sink.sink_address(), "metrics.sink.default");
    }

    #[test]
    fn test_record_publishes_encoded_event() {
        let bus = Arc::new(RecordingBus::default());
        let sink = EventBusSink::builder()
            .event_bus(bus.clone())
            .sink_address("metrics.sink.custom")
            .build()
            .unwrap();

        let event = Event::builder()
            .annotation("k", "v")
            .timer_sample("t", Quantity::new(100, Some(units::BYTE)))
            .build();
        sink.record(&event).unwrap();

        let published = bus.published.lock();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "metrics.sink.custom");
        assert_eq!(EventCodec::new().decode(&published[0].1).unwrap(), event);
    }
}
