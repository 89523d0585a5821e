//! Cloneable wrappers for handing metrics to several owners.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::{Metrics, MetricsFactory};

/// A [`Metrics`] handle that can be cloned and shared between tasks.
///
/// Every call is forwarded unchanged to the wrapped instance; clones all
/// point at the same instance.
#[derive(Clone)]
pub struct SharedMetrics {
    inner: Arc<dyn Metrics>,
}

impl SharedMetrics {
    /// Wrap a metrics instance.
    pub fn new(metrics: impl Metrics + 'static) -> Self {
        Self {
            inner: Arc::new(metrics),
        }
    }

    /// Wrap a boxed instance, such as one returned by a factory.
    pub fn from_box(metrics: Box<dyn Metrics>) -> Self {
        Self {
            inner: Arc::from(metrics),
        }
    }
}

impl From<Box<dyn Metrics>> for SharedMetrics {
    fn from(metrics: Box<dyn Metrics>) -> Self {
        Self::from_box(metrics)
    }
}

impl Metrics for SharedMetrics {
    fn increment_counter(&self, name: &str) {
        self.inner.increment_counter(name)
    }

    fn increment_counter_by(&self, name: &str, value: i64) {
        self.inner.increment_counter_by(name, value)
    }

    fn decrement_counter(&self, name: &str) {
        self.inner.decrement_counter(name)
    }

    fn decrement_counter_by(&self, name: &str, value: i64) {
        self.inner.decrement_counter_by(name, value)
    }

    fn reset_counter(&self, name: &str) {
        self.inner.reset_counter(name)
    }

    fn start_timer(&self, name: &str) {
        self.inner.start_timer(name)
    }

    fn stop_timer(&self, name: &str) {
        self.inner.stop_timer(name)
    }

    fn set_timer(&self, name: &str, duration: Duration) {
        self.inner.set_timer(name, duration)
    }

    fn set_gauge(&self, name: &str, value: f64) {
        self.inner.set_gauge(name, value)
    }

    fn set_integer_gauge(&self, name: &str, value: i64) {
        self.inner.set_integer_gauge(name, value)
    }

    fn add_annotation(&self, key: &str, value: &str) {
        self.inner.add_annotation(key, value)
    }

    fn add_annotations(&self, annotations: &BTreeMap<String, String>) {
        self.inner.add_annotations(annotations)
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn close(&self) {
        self.inner.close()
    }

    fn open_time(&self) -> SystemTime {
        self.inner.open_time()
    }

    fn close_time(&self) -> Option<SystemTime> {
        self.inner.close_time()
    }
}

impl fmt::Debug for SharedMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMetrics")
            .field("is_open", &self.inner.is_open())
            .finish_non_exhaustive()
    }
}

/// A [`MetricsFactory`] handle that can be cloned and shared.
///
/// `create` is forwarded to the wrapped factory; the returned instance is
/// not wrapped.
#[derive(Clone)]
pub struct SharedMetricsFactory {
    inner: Arc<dyn MetricsFactory>,
}

impl SharedMetricsFactory {
    /// Wrap a factory.
    pub fn new(factory: impl MetricsFactory + 'static) -> Self {
        Self {
            inner: Arc::new(factory),
        }
    }
}

impl MetricsFactory for SharedMetricsFactory {
    fn create(&self) -> Box<dyn Metrics> {
        self.inner.create()
    }
}

impl fmt::Debug for SharedMetricsFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMetricsFactory").finish_non_exhaustive()
    }
}
