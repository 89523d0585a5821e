//! Error types for the codec, sinks and dispatch.

use metricsbus_types::ParseUnitError;
use thiserror::Error;

/// Errors raised while encoding or decoding events and units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A base unit or scale name is not recognized.
    #[error("Unknown {kind}: {name}")]
    UnknownUnit {
        /// `"base unit"` or `"base scale"`.
        kind: &'static str,
        /// The name found on the wire.
        name: String,
    },

    /// A JSON node does not match any unit shape.
    #[error("Invalid unit shape: {0}")]
    InvalidUnitShape(String),

    /// The event body is not valid JSON, misses a mandatory key, or holds a
    /// sample that is not a quantity.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The event could not be written as JSON.
    #[error("Failed to encode event: {0}")]
    Encode(String),
}

impl From<ParseUnitError> for CodecError {
    fn from(err: ParseUnitError) -> Self {
        CodecError::UnknownUnit {
            kind: err.kind(),
            name: err.name().to_string(),
        }
    }
}

/// Errors raised when building a sink or service with invalid settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No event bus handle was provided.
    #[error("EventBus cannot be missing")]
    MissingEventBus,

    /// The bus address is empty.
    #[error("Sink address cannot be empty")]
    EmptyAddress,
}

/// Errors a sink can report from `record`.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the backend failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event could not be encoded for the backend.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The backend is no longer accepting events.
    #[error("Sink closed: {0}")]
    Closed(String),

    /// The backend refused the event.
    #[error("Event rejected: {0}")]
    Rejected(String),
}

/// Errors from processing a single bus message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message body could not be decoded into an event.
    #[error(transparent)]
    Decode(#[from] CodecError),

    /// A sink failed while recording the decoded event.
    #[error("Sink {sink} failed: {source}")]
    Sink {
        /// Name of the failing sink.
        sink: String,
        /// The sink's error.
        #[source]
        source: SinkError,
    },
}
