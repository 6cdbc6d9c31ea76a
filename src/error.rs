use crate::model::ValidationError;
use crate::tracker::TrackerError;
use thiserror::Error;

/// Unified error type for the telemetry core.
///
/// Aggregates component errors into actionable categories. Nothing in this
/// crate escalates past "skip this interval": validation and tracker errors
/// consume a tick, sink errors drop one snapshot.
#[derive(Debug, Error)]
pub enum Error {
    #[error("snapshot validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("health tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("telemetry sink error: {message}")]
    Sink { message: String },

    #[error("configuration error: {field}: {message}")]
    Configuration {
        field: &'static str,
        message: String,
    },

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new sink error
    pub fn sink(message: impl Into<String>) -> Self {
        Error::Sink {
            message: message.into(),
        }
    }

    /// Create a new configuration error for a named option
    pub fn configuration(field: &'static str, message: impl Into<String>) -> Self {
        Error::Configuration {
            field,
            message: message.into(),
        }
    }
}
