//! # Domain Errors
//!
//! Error types for the studio. Validation failures never reach the network;
//! `RemoteUnavailable` is the single trigger for the local fallbacks;
//! `RemoteError` is always surfaced to the caller.

use std::fmt;

use thiserror::Error;

/// Operation kinds guarded against concurrent duplicate submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Remote (or fallback) encode.
    Encode,
    /// Remote (or fallback) channel simulation.
    Simulate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encode => write!(f, "encode"),
            Operation::Simulate => write!(f, "simulate"),
        }
    }
}

/// Input rejected before any network call is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Text to encode is empty (after trimming).
    #[error("input text is empty")]
    EmptyInput,

    /// Parity symbol count exceeds the configured bound.
    #[error("ecc symbols {value} out of range (max {max})")]
    EccSymbolsOutOfRange {
        /// Requested symbol count
        value: u32,
        /// Configured maximum
        max: u32,
    },

    /// Error rate outside [0, 1] or not finite.
    #[error("error rate {0} out of range [0, 1]")]
    ErrorRateOutOfRange(f64),

    /// Unknown error type or channel type name.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// Which enumeration was being parsed
        kind: &'static str,
        /// Offending input
        value: String,
    },
}

/// Top-level studio error.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Simulation or decode requested before anything was encoded.
    #[error("no encoded data: encode a message first")]
    NoEncodedData,

    /// Export requested before any simulation ran.
    #[error("no simulation result to export")]
    NothingToExport,

    /// The same operation is already in flight.
    #[error("{0} already in progress")]
    Busy(Operation),

    /// Remote call could not complete (connect failure, DNS, timeout).
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote service answered but reported a failure.
    #[error("remote service error{}: {message}", http_suffix(.status))]
    RemoteError {
        /// HTTP status, when the failure came from a non-2xx response
        status: Option<u16>,
        /// Message extracted from the response body
        message: String,
    },

    /// Response matched no known schema, or violated a schema invariant.
    #[error("unrecognized response: {0}")]
    Decode(String),

    /// Division by zero in a statistic.
    #[error("division by zero computing {0}")]
    DivideByZero(&'static str),

    /// File I/O error (export, preferences).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl StudioError {
    /// Whether this error should route the caller onto the local fallback.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StudioError::RemoteUnavailable(_))
    }
}
