use metricsbus_types::Event;
use tokio::sync::mpsc;
use tracing::warn;

use super::Sink;
use crate::error::SinkError;

/// Forwards events into a tokio channel.
///
/// Sending never blocks. When the channel is full the event is dropped with
/// a warning; when the receiver is gone the sink reports
/// [`SinkError::Closed`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Event>,
}

impl ChannelSink {
    /// Create a channel sink and return both the sink and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use metricsbus_sdk::{ChannelSink, Event, Sink};
    ///
    /// let (sink, mut rx) = ChannelSink::channel(16);
    /// sink.record(&Event::default()).unwrap();
    /// assert!(rx.try_recv().is_ok());
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl Sink for ChannelSink {
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        match self.tx.try_send(event.clone()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Channel sink is full, dropping event");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(SinkError::Closed("channel receiver dropped".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricsbus_types::Quantity;

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::channel(4);
        let event = Event::builder()
            .gauge_sample("depth", Quantity::unitless(5))
            .build();

        sink.record(&event).unwrap();
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (sink, mut rx) = ChannelSink::channel(1);

        for n in ["1", "2"] {
            let event = Event::builder().annotation("n", n).build();
            sink.record(&event).unwrap();
        }

        assert_eq!(rx.try_recv().unwrap().annotations()["n"], "1");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_closed() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);

        let err = sink.record(&Event::default()).unwrap_err();
        assert!(matches!(err, SinkError::Closed(_)));
    }
}
