//! Metrics implementation that records one event per instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use metricsbus_types::{units, Event, Number, Quantity, Samples};
use parking_lot::Mutex;
use tracing::warn;

use super::{Metrics, MetricsFactory};
use crate::sinks::Sink;

#[derive(Debug, Default)]
struct State {
    closed: bool,
    close_time: Option<SystemTime>,
    annotations: BTreeMap<String, String>,
    counters: BTreeMap<String, Vec<i64>>,
    timers: BTreeMap<String, Vec<Duration>>,
    running_timers: BTreeMap<String, Instant>,
    gauges: BTreeMap<String, Vec<Number>>,
}

impl State {
    fn counter(&mut self, name: &str) -> &mut i64 {
        let samples = self.counters.entry(name.to_string()).or_default();
        if samples.is_empty() {
            samples.push(0);
        }
        // Non-empty after the push above
        let last = samples.len() - 1;
        &mut samples[last]
    }

    fn into_event(self) -> Event {
        let counters = self
            .counters
            .into_iter()
            .map(|(name, values)| {
                let samples = values.into_iter().map(Quantity::unitless).collect();
                (name, samples)
            })
            .collect::<Samples>();

        let timers = self
            .timers
            .into_iter()
            .map(|(name, durations)| {
                let samples = durations
                    .into_iter()
                    .map(|d| Quantity::new(nanos(d), Some(units::NANOSECOND)))
                    .collect();
                (name, samples)
            })
            .collect::<Samples>();

        let gauges = self
            .gauges
            .into_iter()
            .map(|(name, values)| {
                let samples = values.into_iter().map(Quantity::unitless).collect();
                (name, samples)
            })
            .collect::<Samples>();

        Event::new(self.annotations, timers, counters, gauges)
    }
}

fn nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

/// [`Metrics`] that builds an [`Event`] and records it to sinks on close.
///
/// Counters produce one sample per counter, plus one more for every
/// [`reset_counter`](Metrics::reset_counter). Timers are recorded in
/// nanoseconds. Gauges produce one sample per call.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use metricsbus_sdk::{ChannelSink, EventMetrics, Metrics, Sink};
///
/// let (sink, mut rx) = ChannelSink::channel(1);
/// let metrics = EventMetrics::new(vec![Arc::new(sink) as Arc<dyn Sink>]);
///
/// metrics.increment_counter("requests");
/// metrics.set_gauge("load", 0.75);
/// metrics.add_annotation("host", "web-1");
/// metrics.close();
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.counter_samples()["requests"].len(), 1);
/// assert_eq!(event.annotations()["host"], "web-1");
/// ```
pub struct EventMetrics {
    sinks: Arc<[Arc<dyn Sink>]>,
    open_time: SystemTime,
    state: Mutex<State>,
}

impl EventMetrics {
    /// Create an open instance recording to `sinks`.
    pub fn new(sinks: impl Into<Arc<[Arc<dyn Sink>]>>) -> Self {
        Self::with_annotations(sinks, BTreeMap::new())
    }

    /// Create an open instance that starts with `annotations`.
    pub fn with_annotations(
        sinks: impl Into<Arc<[Arc<dyn Sink>]>>,
        annotations: BTreeMap<String, String>,
    ) -> Self {
        Self {
            sinks: sinks.into(),
            open_time: SystemTime::now(),
            state: Mutex::new(State {
                annotations,
                ..State::default()
            }),
        }
    }

    // Run `f` against the state unless the instance is closed.
    fn update(&self, operation: &str, name: &str, f: impl FnOnce(&mut State)) {
        let mut state = self.state.lock();
        if state.closed {
            warn!(operation, name, "Metrics already closed, ignoring");
            return;
        }
        f(&mut *state);
    }
}

impl Metrics for EventMetrics {
    fn increment_counter_by(&self, name: &str, value: i64) {
        self.update("increment_counter", name, |state| {
            let counter = state.counter(name);
            *counter = counter.saturating_add(value);
        });
    }

    fn reset_counter(&self, name: &str) {
        self.update("reset_counter", name, |state| {
            state.counters.entry(name.to_string()).or_default().push(0);
        });
    }

    fn start_timer(&self, name: &str) {
        self.update("start_timer", name, |state| {
            if state
                .running_timers
                .insert(name.to_string(), Instant::now())
                .is_some()
            {
                warn!(timer = name, "Timer restarted before it was stopped");
            }
        });
    }

    fn stop_timer(&self, name: &str) {
        self.update("stop_timer", name, |state| {
            match state.running_timers.remove(name) {
                Some(started) => state
                    .timers
                    .entry(name.to_string())
                    .or_default()
                    .push(started.elapsed()),
                None => warn!(timer = name, "Timer stopped but was not started"),
            }
        });
    }

    fn set_timer(&self, name: &str, duration: Duration) {
        self.update("set_timer", name, |state| {
            state
                .timers
                .entry(name.to_string())
                .or_default()
                .push(duration);
        });
    }

    fn set_gauge(&self, name: &str, value: f64) {
        self.update("set_gauge", name, |state| match Number::from_f64(value) {
            Some(value) => state.gauges.entry(name.into()).or_default().push(value),
            None => warn!(gauge = name, value, "Dropping non-finite gauge sample"),
        });
    }

    fn set_integer_gauge(&self, name: &str, value: i64) {
        self.update("set_gauge", name, |state| {
            state
                .gauges
                .entry(name.to_string())
                .or_default()
                .push(Number::from_i64(value));
        });
    }

    fn add_annotation(&self, key: &str, value: &str) {
        self.update("add_annotation", key, |state| {
            state.annotations.insert(key.to_string(), value.to_string());
        });
    }

    fn is_open(&self) -> bool {
        !self.state.lock().closed
    }

    fn close(&self) {
        let event = {
            let mut state = self.state.lock();
            if state.closed {
                warn!("Metrics already closed");
                return;
            }

            for name in state.running_timers.keys() {
                warn!(timer = %name, "Discarding timer that was never stopped");
            }
            let taken = std::mem::take(&mut *state);
            state.closed = true;
            state.close_time = Some(SystemTime::now());
            taken.into_event()
        };

        for sink in self.sinks.iter() {
            if let Err(e) = sink.record(&event) {
                warn!(sink = sink.name(), error = %e, "Failed to record metrics event");
            }
        }
    }

    fn open_time(&self) -> SystemTime {
        self.open_time
    }

    fn close_time(&self) -> Option<SystemTime> {
        self.state.lock().close_time
    }
}

impl fmt::Debug for EventMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMetrics")
            .field("sinks", &self.sinks.len())
            .field("open_time", &self.open_time)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Creates [`EventMetrics`] that share a sink list and default annotations.
#[derive(Clone)]
pub struct EventMetricsFactory {
    sinks: Arc<[Arc<dyn Sink>]>,
    annotations: BTreeMap<String, String>,
}

impl EventMetricsFactory {
    /// Create a builder.
    pub fn builder() -> EventMetricsFactoryBuilder {
        EventMetricsFactoryBuilder::default()
    }

    /// Annotations added to every created instance.
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

impl MetricsFactory for EventMetricsFactory {
    fn create(&self) -> Box<dyn Metrics> {
        Box::new(EventMetrics::with_annotations(
            self.sinks.clone(),
            self.annotations.clone(),
        ))
    }
}

impl fmt::Debug for EventMetricsFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMetricsFactory")
            .field("sinks", &self.sinks.len())
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Builder for [`EventMetricsFactory`].
#[derive(Default)]
pub struct EventMetricsFactoryBuilder {
    sinks: Vec<Arc<dyn Sink>>,
    annotations: BTreeMap<String, String>,
}

impl EventMetricsFactoryBuilder {
    /// Add a sink.
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add several shared sinks.
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Add a default annotation.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Build the factory.
    pub fn build(self) -> EventMetricsFactory {
        EventMetricsFactory {
            sinks: self.sinks.into(),
            annotations: self.annotations,
        }
    }
}

impl fmt::Debug for EventMetricsFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMetricsFactoryBuilder")
            .field("sinks", &self.sinks.len())
            .field("annotations", &self.annotations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<Event>>,
    }

    impl Sink for Recording {
        fn record(&self, event: &Event) -> Result<(), SinkError> {
            self.events.lock().push(event.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Sink for Failing {
        fn record(&self, _event: &Event) -> Result<(), SinkError> {
            Err(SinkError::Closed("gone".to_string()))
        }
    }

    fn metrics() -> (EventMetrics, Arc<Recording>) {
        let sink = Arc::new(Recording::default());
        let sinks: Vec<Arc<dyn Sink>> = vec![sink.clone()];
        (EventMetrics::new(sinks), sink)
    }

    fn closed_event(metrics: &EventMetrics, sink: &Recording) -> Event {
        metrics.close();
        let events = sink.events.lock();
        assert_eq!(events.len(), 1);
        events[0].clone()
    }

    #[test]
    fn test_counters() {
        let (metrics, sink) = metrics();

        metrics.increment_counter("a");
        metrics.increment_counter_by("a", 4);
        metrics.decrement_counter("a");
        metrics.decrement_counter_by("b", 2);

        let event = closed_event(&metrics, &sink);
        assert_eq!(event.counter_samples()["a"], vec![Quantity::unitless(4)]);
        assert_eq!(event.counter_samples()["b"], vec![Quantity::unitless(-2)]);
    }

    #[test]
    fn test_reset_counter_starts_new_sample() {
        let (metrics, sink) = metrics();

        metrics.increment_counter_by("a", 3);
        metrics.reset_counter("a");
        metrics.increment_counter("a");
        metrics.reset_counter("fresh");

        let event = closed_event(&metrics, &sink);
        assert_eq!(
            event.counter_samples()["a"],
            vec![Quantity::unitless(3), Quantity::unitless(1)]
        );
        assert_eq!(
            event.counter_samples()["fresh"],
            vec![Quantity::unitless(0)]
        );
    }

    #[test]
    fn test_timers_in_nanoseconds() {
        let (metrics, sink) = metrics();

        metrics.set_timer("explicit", Duration::from_millis(5));
        metrics.start_timer("measured");
        metrics.stop_timer("measured");
        metrics.stop_timer("never-started");

        let event = closed_event(&metrics, &sink);
        assert_eq!(
            event.timer_samples()["explicit"],
            vec![Quantity::new(5_000_000, Some(units::NANOSECOND))]
        );
        let measured = &event.timer_samples()["measured"];
        assert_eq!(measured.len(), 1);
        assert_eq!(measured[0].unit(), Some(&units::NANOSECOND));
        assert!(!event.timer_samples().contains_key("never-started"));
    }

    #[test]
    fn test_running_timer_discarded_on_close() {
        let (metrics, sink) = metrics();

        metrics.start_timer("open");

        let event = closed_event(&metrics, &sink);
        assert!(event.timer_samples().is_empty());
    }

    #[test]
    fn test_gauges() {
        let (metrics, sink) = metrics();

        metrics.set_gauge("load", 0.5);
        metrics.set_gauge("load", f64::NAN);
        metrics.set_gauge("load", f64::INFINITY);
        metrics.set_integer_gauge("depth", 12);

        let event = closed_event(&metrics, &sink);
        let load = &event.gauge_samples()["load"];
        assert_eq!(load.len(), 1);
        assert_eq!(load[0].value().as_f64(), 0.5);
        assert_eq!(event.gauge_samples()["depth"], vec![Quantity::unitless(12)]);
    }

    #[test]
    fn test_annotations() {
        let (metrics, sink) = metrics();

        metrics.add_annotation("host", "a");
        metrics.add_annotation("host", "b");
        let mut more = BTreeMap::new();
        more.insert("region".to_string(), "eu".to_string());
        metrics.add_annotations(&more);

        let event = closed_event(&metrics, &sink);
        assert_eq!(event.annotations()["host"], "b");
        assert_eq!(event.annotations()["region"], "eu");
    }

    #[test]
    fn test_lifecycle() {
        let (metrics, sink) = metrics();
        assert!(metrics.is_open());
        assert!(metrics.close_time().is_none());

        metrics.close();
        assert!(!metrics.is_open());
        let close_time = metrics.close_time().unwrap();
        assert!(close_time >= metrics.open_time());

        // Everything after close is ignored, including a second close
        metrics.increment_counter("late");
        metrics.close();
        assert_eq!(sink.events.lock().len(), 1);
        assert_eq!(metrics.close_time(), Some(close_time));
    }

    #[test]
    fn test_close_continues_past_failing_sink() {
        let recording = Arc::new(Recording::default());
        let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(Failing), recording.clone()];
        let metrics = EventMetrics::new(sinks);

        metrics.increment_counter("a");
        metrics.close();

        assert_eq!(recording.events.lock().len(), 1);
    }

    #[test]
    fn test_factory_applies_default_annotations() {
        let recording = Arc::new(Recording::default());
        let factory = EventMetricsFactory::builder()
            .sinks([recording.clone() as Arc<dyn Sink>])
            .annotation("service", "checkout")
            .build();

        let first = factory.create();
        let second = factory.create();
        first.add_annotation("request", "1");
        first.close();
        second.close();

        let events = recording.events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].annotations()["service"], "checkout");
        assert_eq!(events[0].annotations()["request"], "1");
        assert!(!events[1].annotations().contains_key("request"));
        assert_eq!(factory.annotations().len(), 1);
    }
}
