//! Producer-side metrics API.
//!
//! A [`Metrics`] instance collects counters, timers, gauges and annotations
//! for one unit of work and turns them into a single [`Event`] when closed.
//! [`MetricsFactory`] hands out fresh instances.
//!
//! [`Event`]: metricsbus_types::Event

mod recorder;
mod shared;

pub use recorder::{EventMetrics, EventMetricsFactory, EventMetricsFactoryBuilder};
pub use shared::{SharedMetrics, SharedMetricsFactory};

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

/// A collection of samples for one unit of work.
///
/// All methods take `&self` so an instance can be shared between threads.
/// Calls made after [`close`](Metrics::close) are ignored.
///
/// Counters and timers are addressed by name only. There are no counter or
/// timer handle objects (`createCounter`/`createTimer` style), and wrappers
/// such as [`SharedMetrics`] forward exactly the calls on this trait.
pub trait Metrics: Send + Sync {
    /// Add one to a counter.
    fn increment_counter(&self, name: &str) {
        self.increment_counter_by(name, 1);
    }

    /// Add `value` to a counter.
    fn increment_counter_by(&self, name: &str, value: i64);

    /// Subtract one from a counter.
    fn decrement_counter(&self, name: &str) {
        self.decrement_counter_by(name, 1);
    }

    /// Subtract `value` from a counter.
    fn decrement_counter_by(&self, name: &str, value: i64) {
        self.increment_counter_by(name, value.saturating_neg());
    }

    /// Start a new sample for a counter at zero.
    ///
    /// Earlier samples of the counter are kept.
    fn reset_counter(&self, name: &str);

    /// Start timing `name`.
    fn start_timer(&self, name: &str);

    /// Stop timing `name` and record the elapsed time.
    fn stop_timer(&self, name: &str);

    /// Record an explicit timer sample.
    fn set_timer(&self, name: &str, duration: Duration);

    /// Record a gauge sample.
    fn set_gauge(&self, name: &str, value: f64);

    /// Record an integral gauge sample.
    fn set_integer_gauge(&self, name: &str, value: i64);

    /// Add an annotation, replacing any existing value for `key`.
    fn add_annotation(&self, key: &str, value: &str);

    /// Add several annotations.
    fn add_annotations(&self, annotations: &BTreeMap<String, String>) {
        for (key, value) in annotations {
            self.add_annotation(key, value);
        }
    }

    /// Whether samples are still being accepted.
    fn is_open(&self) -> bool;

    /// Stop accepting samples and publish them.
    fn close(&self);

    /// When the instance was created.
    fn open_time(&self) -> SystemTime;

    /// When the instance was closed, if it has been.
    fn close_time(&self) -> Option<SystemTime>;
}

/// Creates [`Metrics`] instances.
pub trait MetricsFactory: Send + Sync {
    /// Create a new, open instance.
    fn create(&self) -> Box<dyn Metrics>;
}
