use metricsbus_types::Event;
use tracing::info;

use super::Sink;
use crate::error::SinkError;

/// Logs a summary of every event at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink {
    _private: (),
}

impl LogSink {
    /// Create a log sink.
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Sink for LogSink {
    fn record(&self, event: &Event) -> Result<(), SinkError> {
        info!(
            annotations = ?event.annotations(),
            timers = event.timer_samples().len(),
            counters = event.counter_samples().len(),
            gauges = event.gauge_samples().len(),
            samples = event.sample_count(),
            "Recorded event"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
