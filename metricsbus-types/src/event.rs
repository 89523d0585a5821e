//! Event - an immutable snapshot of samples recorded by a producer.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::Quantity;

/// Samples keyed by metric name. Each metric may carry several samples.
pub type Samples = BTreeMap<String, Vec<Quantity>>;

/// An immutable snapshot of annotations and timer, counter and gauge samples.
///
/// Events are produced once, either by a producer closing its metrics or by
/// decoding a bus message, and are only ever read afterwards. Equality and
/// hashing are structural over all four maps.
///
/// # Example
///
/// ```rust
/// use metricsbus_types::{units, Event, Quantity};
///
/// let event = Event::builder()
///     .annotation("service", "checkout")
///     .gauge_sample("queue_depth", Quantity::unitless(17))
///     .gauge_sample("queue_depth", Quantity::unitless(12))
///     .timer_sample("latency", Quantity::new(40, Some(units::MILLISECOND)))
///     .build();
///
/// assert_eq!(event.gauge_samples()["queue_depth"].len(), 2);
/// assert_eq!(event.annotations()["service"], "checkout");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Event {
    annotations: BTreeMap<String, String>,
    timer_samples: Samples,
    counter_samples: Samples,
    gauge_samples: Samples,
}

impl Event {
    /// Create an event from its four maps.
    pub fn new(
        annotations: BTreeMap<String, String>,
        timer_samples: Samples,
        counter_samples: Samples,
        gauge_samples: Samples,
    ) -> Self {
        Self {
            annotations,
            timer_samples,
            counter_samples,
            gauge_samples,
        }
    }

    /// Create a builder for constructing events.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Free-text annotations.
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Timer samples keyed by timer name.
    pub fn timer_samples(&self) -> &Samples {
        &self.timer_samples
    }

    /// Counter samples keyed by counter name.
    pub fn counter_samples(&self) -> &Samples {
        &self.counter_samples
    }

    /// Gauge samples keyed by gauge name.
    pub fn gauge_samples(&self) -> &Samples {
        &self.gauge_samples
    }

    /// Check if the event carries no annotations and no samples.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.timer_samples.is_empty()
            && self.counter_samples.is_empty()
            && self.gauge_samples.is_empty()
    }

    /// Total number of samples across timers, counters and gauges.
    pub fn sample_count(&self) -> usize {
        [&self.timer_samples, &self.counter_samples, &self.gauge_samples]
            .iter()
            .flat_map(|samples| samples.values())
            .map(Vec::len)
            .sum()
    }
}

/// Builder for `Event`.
///
/// Maps not set on the builder are empty in the built event.
#[derive(Debug, Default)]
pub struct EventBuilder {
    annotations: BTreeMap<String, String>,
    timer_samples: Samples,
    counter_samples: Samples,
    gauge_samples: Samples,
}

impl EventBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single annotation, replacing any previous value for the key.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Replace all annotations.
    pub fn annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Append a timer sample.
    pub fn timer_sample(mut self, name: impl Into<String>, sample: Quantity) -> Self {
        self.timer_samples.entry(name.into()).or_default().push(sample);
        self
    }

    /// Replace all timer samples.
    pub fn timer_samples(mut self, samples: Samples) -> Self {
        self.timer_samples = samples;
        self
    }

    /// Append a counter sample.
    pub fn counter_sample(mut self, name: impl Into<String>, sample: Quantity) -> Self {
        self.counter_samples.entry(name.into()).or_default().push(sample);
        self
    }

    /// Replace all counter samples.
    pub fn counter_samples(mut self, samples: Samples) -> Self {
        self.counter_samples = samples;
        self
    }

    /// Append a gauge sample.
    pub fn gauge_sample(mut self, name: impl Into<String>, sample: Quantity) -> Self {
        self.gauge_samples.entry(name.into()).or_default().push(sample);
        self
    }

    /// Replace all gauge samples.
    pub fn gauge_samples(mut self, samples: Samples) -> Self {
        self.gauge_samples = samples;
        self
    }

    /// Build the event.
    pub fn build(self) -> Event {
        Event {
            annotations: self.annotations,
            timer_samples: self.timer_samples,
            counter_samples: self.counter_samples,
            gauge_samples: self.gauge_samples,
        }
    }
}
