//! In-process publish/subscribe bus.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use super::{EventBus, Message};

type Subscribers = BTreeMap<String, Vec<mpsc::UnboundedSender<Message>>>;

/// A local bus delivering messages to subscribers in the same process.
///
/// Every subscriber of an address receives its own copy of each message
/// published there. Cloning the bus yields another handle to the same
/// subscriber table.
///
/// # Example
///
/// ```rust
/// use metricsbus_sdk::{EventBus, LocalBus};
///
/// # tokio_test::block_on(async {
/// let bus = LocalBus::new();
/// let mut subscription = bus.subscribe("metrics.sink.default");
///
/// bus.publish("metrics.sink.default", "{}".to_string());
///
/// let message = subscription.recv().await.unwrap();
/// assert_eq!(message.body(), Some("{}"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalBus {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl LocalBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to messages published to `address`.
    ///
    /// The subscription stays registered until it is dropped.
    pub fn subscribe(&self, address: impl Into<String>) -> Subscription {
        let address = address.into();
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers
            .write()
            .entry(address.clone())
            .or_default()
            .push(tx);
        debug!(address = %address, "Subscribed to bus address");

        Subscription {
            address,
            receiver: rx,
        }
    }

    /// Deliver a message to every subscriber of its address.
    ///
    /// Unlike [`EventBus::publish`] the message may carry no body.
    pub fn deliver(&self, message: Message) {
        let mut closed = false;
        {
            let subscribers = self.subscribers.read();
            match subscribers.get(message.address()) {
                Some(senders) if !senders.is_empty() => {
                    for tx in senders {
                        closed |= tx.send(message.clone()).is_err();
                    }
                }
                _ => {
                    debug!(address = %message.address(), "No subscribers for bus address");
                }
            }
        }

        if closed {
            self.prune(message.address());
        }
    }

    /// Number of live subscriptions for `address`.
    pub fn subscriber_count(&self, address: &str) -> usize {
        match self.subscribers.read().get(address) {
            Some(senders) => senders.iter().filter(|tx| !tx.is_closed()).count(),
            None => 0,
        }
    }

    // Drop senders whose subscription has gone away.
    fn prune(&self, address: &str) {
        let mut subscribers = self.subscribers.write();
        if let Some(senders) = subscribers.get_mut(address) {
            senders.retain(|tx| !tx.is_closed());
            if senders.is_empty() {
                subscribers.remove(address);
            }
        }
    }
}

impl EventBus for LocalBus {
    fn publish(&self, address: &str, body: String) {
        self.deliver(Message::with_body(address, body));
    }
}

/// Receiving end of a bus subscription.
#[derive(Debug)]
pub struct Subscription {
    address: String,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    /// The subscribed address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once every handle to the bus has been dropped and all
    /// queued messages have been received.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Take the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}
