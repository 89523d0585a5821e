//! Example: publishing metrics over an in-process bus.
//!
//! Run with: cargo run -p metricsbus-sdk --example local_bus

use std::sync::Arc;
use std::time::Duration;

use metricsbus_sdk::{
    EventBusSink, EventMetricsFactory, LocalBus, LogSink, Metrics, MetricsFactory, SinkService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bus = LocalBus::new();

    // Consumer side: log every event that arrives on the default address
    let service = SinkService::builder()
        .sink(LogSink::new())
        .build()?
        .start(&bus);

    // Producer side: each closed Metrics instance is published as one event
    let publisher = EventBusSink::builder()
        .event_bus(Arc::new(bus.clone()))
        .build()?;
    let factory = EventMetricsFactory::builder()
        .sink(publisher)
        .annotation("service", "local-bus-example")
        .build();

    for request in 0..3 {
        let metrics = factory.create();
        metrics.add_annotation("request", &request.to_string());
        metrics.start_timer("handle");
        tokio::time::sleep(Duration::from_millis(10 * (request + 1))).await;
        metrics.stop_timer("handle");
        metrics.increment_counter("requests");
        metrics.set_gauge("load", 0.25 * request as f64);
        metrics.close();
    }

    service.stop();
    service.join().await;
    Ok(())
}
