//! # metricsbus
//!
//! Relay and validate metrics events carried as newline-delimited JSON.
//!
//! The binary wires the pieces of [`metricsbus_sdk`] together: it reads
//! encoded events, publishes each one to a [`LocalBus`] address, and lets a
//! [`SinkService`] decode them and record them to the configured sinks.
//!
//! ## Usage
//!
//! ```bash
//! # Relay events from a file to the sinks in metricsbus.toml
//! metricsbus --config metricsbus.toml relay --input events.ndjson
//!
//! # Relay stdin to a custom address
//! cat events.ndjson | metricsbus relay --address metrics.sink.orders
//!
//! # Validate a stream without recording anything
//! metricsbus check --input events.ndjson
//! ```
//!
//! ## As a library
//!
//! ```
//! use metricsbus::{relay, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let input = "{\"annotations\":{},\"timerSamples\":{},\"counterSamples\":{},\"gaugeSamples\":{}}\n";
//!
//! let stats = relay::relay(input.as_bytes(), &settings).await.unwrap();
//! assert_eq!(stats.published, 1);
//! # });
//! ```
//!
//! [`LocalBus`]: metricsbus_sdk::LocalBus
//! [`SinkService`]: metricsbus_sdk::SinkService

pub mod relay;
pub mod settings;

pub use relay::{CheckSummary, RelayStats};
pub use settings::{Settings, SinkSettings};
