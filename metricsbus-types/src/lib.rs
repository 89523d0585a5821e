//! # metricsbus-types
//!
//! Core types for metrics events. This crate defines the value model that
//! producers build and sinks consume: measurement units, quantities, and the
//! immutable [`Event`] snapshot that travels over the bus.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: the wire codec lives in `metricsbus-sdk`
//! - **Closed unit model**: [`Unit`] is a sum type over base, scaled and
//!   compound shapes
//! - **Immutable events**: an [`Event`] is built once and never mutated
//! - **Structural equality**: events, quantities and units compare and hash by
//!   value
//!
//! ## Features
//!
//! - `std` (default): Standard library support (`std::error::Error` impls)
//!
//! ## Example
//!
//! ```rust
//! use metricsbus_types::{units, Event, Quantity};
//!
//! let event = Event::builder()
//!     .annotation("host", "web-01")
//!     .timer_sample("request", Quantity::new(12, Some(units::MILLISECOND)))
//!     .counter_sample("hits", Quantity::unitless(3))
//!     .build();
//!
//! assert_eq!(event.timer_samples()["request"].len(), 1);
//! assert!(event.gauge_samples().is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod number;
mod quantity;
mod unit;
pub mod units;

pub use event::*;
pub use number::*;
pub use quantity::*;
pub use unit::*;
