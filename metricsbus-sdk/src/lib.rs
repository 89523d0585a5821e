//! # metricsbus-sdk
//!
//! Publish metrics events over a message bus and fan them out to sinks.
//!
//! Producers record samples through [`Metrics`] and hand the resulting
//! [`Event`] to an [`EventBusSink`], which encodes it as JSON and publishes
//! it to a bus address. On the consuming side a [`SinkHandler`] decodes each
//! message and records the event to every configured [`Sink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metricsbus_sdk::{
//!     EventBusSink, EventMetricsFactory, LocalBus, LogSink, Metrics, MetricsFactory,
//!     SinkService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = LocalBus::new();
//!
//!     // Consumer: log every event published to the default address
//!     let service = SinkService::builder()
//!         .sink(LogSink::new())
//!         .build()
//!         .unwrap()
//!         .start(&bus);
//!
//!     // Producer: every closed Metrics instance becomes one event on the bus
//!     let publisher = EventBusSink::builder()
//!         .event_bus(Arc::new(bus.clone()))
//!         .build()
//!         .unwrap();
//!     let factory = EventMetricsFactory::builder().sink(publisher).build();
//!
//!     let metrics = factory.create();
//!     metrics.increment_counter("orders");
//!     metrics.close();
//!
//!     service.stop();
//!     service.join().await;
//! }
//! ```
//!
//! ## Features
//!
//! - `tokio` (default): [`LocalBus`], [`SinkService`] and [`ChannelSink`]

pub mod bus;
pub mod codec;
pub mod error;
mod handler;
pub mod metrics;
pub mod sinks;

#[cfg(feature = "tokio")]
mod service;

pub use bus::{EventBus, Message, DEFAULT_SINK_ADDRESS};
pub use codec::{EventCodec, UnitCodec};
pub use error::{CodecError, ConfigurationError, DispatchError, SinkError};
pub use handler::{MessageHandler, SinkHandler};
pub use metrics::{
    EventMetrics, EventMetricsFactory, Metrics, MetricsFactory, SharedMetrics, SharedMetricsFactory,
};
pub use sinks::{EventBusSink, EventBusSinkBuilder, FileSink, LogSink, Sink};

#[cfg(feature = "tokio")]
pub use bus::{LocalBus, Subscription};
#[cfg(feature = "tokio")]
pub use service::{ServiceHandle, SinkService, SinkServiceBuilder};
#[cfg(feature = "tokio")]
pub use sinks::ChannelSink;

// Re-export types for convenience
pub use metricsbus_types::{
    units, BaseScale, BaseUnit, CompoundUnit, Event, EventBuilder, Number, Quantity, ScaledUnit,
    Unit,
};
