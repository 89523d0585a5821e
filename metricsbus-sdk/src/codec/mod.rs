//! JSON codec for events and units.
//!
//! The wire form of an event is a JSON object with exactly four keys:
//!
//! ```text
//! {
//!   "annotations":    { <string>: <string>, ... },
//!   "timerSamples":   { <string>: [ <quantity>, ... ], ... },
//!   "counterSamples": { <string>: [ <quantity>, ... ], ... },
//!   "gaugeSamples":   { <string>: [ <quantity>, ... ], ... }
//! }
//! ```
//!
//! where `<quantity>` is `{"value": <number>, "unit": <unit>}` with the unit
//! optional. See [`UnitCodec`] for the unit shapes.

mod event;
mod unit;

pub use event::EventCodec;
pub use unit::UnitCodec;
