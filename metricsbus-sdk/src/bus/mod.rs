//! Bus abstraction for moving encoded events between producers and sinks.
//!
//! The core only needs two things from a bus: publishing text to a named
//! address ([`EventBus`]) and receiving the messages published to an address.
//! [`LocalBus`] provides both in-process.

#[cfg(feature = "tokio")]
mod local;

#[cfg(feature = "tokio")]
pub use local::{LocalBus, Subscription};

use std::fmt::Debug;
use std::sync::Arc;

/// Address used by sinks and handlers when none is configured.
pub const DEFAULT_SINK_ADDRESS: &str = "metrics.sink.default";

/// A message delivered on the bus.
///
/// The body is optional: a bus may deliver messages that carry no payload,
/// and handlers treat those as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    address: String,
    body: Option<String>,
}

impl Message {
    /// Create a message.
    pub fn new(address: impl Into<String>, body: Option<String>) -> Self {
        Self {
            address: address.into(),
            body,
        }
    }

    /// Create a message carrying a text body.
    pub fn with_body(address: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(address, Some(body.into()))
    }

    /// The address this message was published to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The text body, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Capability to publish text to a named bus address.
pub trait EventBus: Send + Sync + Debug {
    /// Publish a body to every subscriber of `address`.
    ///
    /// Publishing is fire-and-forget: a message with no subscribers is
    /// dropped.
    fn publish(&self, address: &str, body: String);
}

impl<B: EventBus + ?Sized> EventBus for Arc<B> {
    fn publish(&self, address: &str, body: String) {
        (**self).publish(address, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_accessors() {
        let message = Message::with_body("metrics.sink.test", "{}");
        assert_eq!(message.address(), "metrics.sink.test");
        assert_eq!(message.body(), Some("{}"));

        let empty = Message::new(DEFAULT_SINK_ADDRESS, None);
        assert_eq!(empty.address(), "metrics.sink.default");
        assert!(empty.body().is_none());
    }
}
