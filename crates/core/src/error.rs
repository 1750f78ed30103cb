//! Error types for stkfold

use thiserror::Error;

/// Main error type for cross-validation operations.
///
/// Every variant is local to one configuration: it aborts that
/// configuration's evaluation and nothing else.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No points to index")]
    EmptyInput,

    #[error("Invalid argument: {name} = {value} ({reason})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Interpolation attempted with zero neighbors")]
    InsufficientNeighbors,

    #[error("Ground truth of point {ordinal} is zero; relative error is undefined")]
    DivisionByZero { ordinal: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No radius stored for time scale {time_scale}")]
    MissingRadius { time_scale: String },
}

impl Error {
    /// Stable label used when a failure is reported instead of a result.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "IoError",
            Error::Serialization(_) => "SerializationError",
            Error::EmptyInput => "EmptyInputError",
            Error::InvalidArgument { .. } => "InvalidArgumentError",
            Error::InsufficientNeighbors => "InsufficientNeighborsError",
            Error::DivisionByZero { .. } => "DivisionByZeroError",
            Error::Configuration(_) | Error::MissingRadius { .. } => "ConfigurationError",
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(name: &'static str, value: impl ToString, reason: &str) -> Self {
        Error::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for stkfold operations
pub type Result<T> = std::result::Result<T, Error>;
