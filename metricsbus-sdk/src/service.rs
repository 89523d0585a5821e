//! Background service that feeds bus messages to a handler.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::bus::{LocalBus, Message, Subscription, DEFAULT_SINK_ADDRESS};
use crate::codec::EventCodec;
use crate::error::ConfigurationError;
use crate::handler::{MessageHandler, SinkHandler};
use crate::sinks::Sink;

/// Subscribes a handler to a bus address and runs it in the background.
///
/// Messages are handled one at a time on tokio's blocking pool, so sinks may
/// perform blocking I/O.
///
/// # Example
///
/// ```rust
/// use metricsbus_sdk::{ChannelSink, Event, EventBusSink, LocalBus, Sink, SinkService};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let bus = LocalBus::new();
/// let (sink, mut rx) = ChannelSink::channel(16);
///
/// let handle = SinkService::builder()
///     .sink(sink)
///     .build()
///     .unwrap()
///     .start(&bus);
///
/// let producer = EventBusSink::builder()
///     .event_bus(Arc::new(bus.clone()))
///     .build()
///     .unwrap();
/// producer.record(&Event::default()).unwrap();
///
/// assert!(rx.recv().await.unwrap().is_empty());
///
/// handle.stop();
/// handle.join().await;
/// # });
/// ```
pub struct SinkService {
    address: String,
    handler: Arc<dyn MessageHandler>,
}

impl SinkService {
    /// Create a builder.
    pub fn builder() -> SinkServiceBuilder {
        SinkServiceBuilder::new()
    }

    /// The address the service subscribes to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Subscribe to the bus and start handling messages.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self, bus: &LocalBus) -> ServiceHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let subscription = bus.subscribe(self.address.clone());

        info!(address = %self.address, "Sink service started");
        let task = tokio::spawn(run(subscription, self.handler, stop_rx));

        ServiceHandle { stop_tx, task }
    }
}

impl fmt::Debug for SinkService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkService")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

async fn run(
    mut subscription: Subscription,
    handler: Arc<dyn MessageHandler>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let address = subscription.address().to_string();
    let mut watching = true;

    loop {
        tokio::select! {
            biased;

            message = subscription.recv() => match message {
                Some(message) => dispatch(&handler, message).await,
                None => {
                    debug!(address = %address, "Bus closed");
                    break;
                }
            },
            changed = stop_rx.changed(), if watching => {
                if changed.is_err() {
                    // Handle dropped without stop: run until the bus closes
                    watching = false;
                    continue;
                }
                if *stop_rx.borrow() {
                    // Handle what was already delivered before leaving
                    while let Some(message) = subscription.try_recv() {
                        dispatch(&handler, message).await;
                    }
                    break;
                }
            }
        }
    }

    info!(address = %address, "Sink service stopped");
}

async fn dispatch(handler: &Arc<dyn MessageHandler>, message: Message) {
    let handler = handler.clone();
    let result = tokio::task::spawn_blocking(move || handler.handle(Some(&message))).await;
    if let Err(e) = result {
        error!(error = %e, "Message handler panicked");
    }
}

/// Handle for a running [`SinkService`].
#[derive(Debug)]
pub struct ServiceHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServiceHandle {
    /// Ask the service to stop.
    ///
    /// Messages already delivered to the service are handled first.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Wait for the service to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "Sink service task failed");
        }
    }
}

/// Builder for [`SinkService`].
pub struct SinkServiceBuilder {
    address: String,
    sinks: Vec<Arc<dyn Sink>>,
    codec: EventCodec,
    handler: Option<Arc<dyn MessageHandler>>,
}

impl SinkServiceBuilder {
    /// Create a builder with the default address and no sinks.
    pub fn new() -> Self {
        Self {
            address: DEFAULT_SINK_ADDRESS.to_string(),
            sinks: Vec::new(),
            codec: EventCodec::new(),
            handler: None,
        }
    }

    /// Add a sink. Sinks are invoked in the order they are added.
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add several shared sinks.
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Set the address to subscribe to.
    ///
    /// Defaults to [`DEFAULT_SINK_ADDRESS`].
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the codec used by the default handler.
    pub fn codec(mut self, codec: EventCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Use a custom handler instead of a [`SinkHandler`] over the sinks.
    ///
    /// Sinks and codec are ignored when a handler is set.
    pub fn handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<SinkService, ConfigurationError> {
        if self.address.is_empty() {
            return Err(ConfigurationError::EmptyAddress);
        }

        let handler = match self.handler {
            Some(handler) => handler,
            None => Arc::new(SinkHandler::with_codec(self.sinks, self.codec)),
        };

        Ok(SinkService {
            address: self.address,
            handler,
        })
    }
}

impl Default for SinkServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SinkServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkServiceBuilder")
            .field("address", &self.address)
            .field("sinks", &self.sinks.len())
            .field("custom_handler", &self.handler.is_some())
            .finish()
    }
}
