//! Error types for timing-service access.
//!
//! Every fallible operation in the crate returns [`TimingError`]. Errors carry
//! enough context to be shown to a user as-is, and classify themselves so the
//! subscription driver can decide whether reconnecting is worthwhile.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: HTTP or WebSocket I/O failures
//! - **Service Errors**: non-success HTTP status or a GraphQL `errors` array
//! - **Payload Errors**: JSON decode failures and envelopes without data
//! - **Protocol Errors**: unexpected subscription messages
//! - **Configuration Errors**: unreadable or invalid config files
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use pitboard::TimingError;
//!
//! let error = TimingError::transport("connection reset by peer");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for timing operations.
pub type Result<T, E = TimingError> = std::result::Result<T, E>;

/// Main error type for timing operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TimingError {
    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Timing service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{message}")]
    GraphQl { message: String, additional: usize },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Subscription protocol error: {details}")]
    Protocol { details: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Configuration error in {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("Invalid lap time: {millis}ms is negative")]
    InvalidLapTime { millis: i64 },

    #[error("Response contained no {field}")]
    MissingData { field: String },
}

impl TimingError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TimingError::Transport { .. } => true,
            TimingError::Timeout { .. } => true,
            TimingError::Http { status, .. } => *status >= 500 || *status == 429,
            TimingError::Protocol { .. } => true,
            TimingError::GraphQl { .. } => false,
            TimingError::Parse { .. } => false,
            TimingError::Config { .. } => false,
            TimingError::InvalidLapTime { .. } => false,
            TimingError::MissingData { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TimingError::Transport { .. } => vec![
                "Check network connectivity",
                "Verify the timing endpoint URL",
                "Retry once the service is reachable",
            ],
            TimingError::Http { .. } => vec![
                "Check the timing service status",
                "Verify the endpoint accepts GraphQL POST requests",
            ],
            TimingError::GraphQl { .. } => vec![
                "Check the session or championship id",
                "Verify the query matches the service schema",
            ],
            TimingError::Parse { .. } => vec![
                "Check payload compatibility with this client version",
                "Inspect the raw response with debug logging enabled",
            ],
            TimingError::Protocol { .. } => vec![
                "Verify the endpoint speaks graphql-transport-ws",
                "Reconnect to start a fresh subscription",
            ],
            TimingError::Timeout { .. } => vec![
                "Increase the request or connect timeout",
                "Check network latency to the timing service",
            ],
            TimingError::Config { .. } => vec![
                "Check the config file exists and is readable",
                "Validate the YAML syntax and field names",
            ],
            TimingError::InvalidLapTime { .. } => vec![
                "Lap times must be non-negative milliseconds",
            ],
            TimingError::MissingData { .. } => vec![
                "Check the requested id exists",
                "The session may not be published yet",
            ],
        }
    }

    /// Helper constructor for transport errors.
    pub fn transport(reason: impl Into<String>) -> Self {
        TimingError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TimingError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        TimingError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for subscription protocol errors.
    pub fn protocol(details: impl Into<String>) -> Self {
        TimingError::Protocol { details: details.into() }
    }

    /// Helper constructor for a GraphQL `errors` array.
    ///
    /// The first message is surfaced; the rest are only counted.
    pub fn graphql<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut messages = messages.into_iter();
        let message = messages
            .next()
            .map(Into::into)
            .unwrap_or_else(|| "Timing service reported an unspecified error".to_string());
        TimingError::GraphQl { message, additional: messages.count() }
    }

    /// Helper constructor for config errors.
    pub fn config(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        TimingError::Config { path: path.into(), details: details.into() }
    }

    /// Helper constructor for envelopes missing a payload field.
    pub fn missing(field: impl Into<String>) -> Self {
        TimingError::MissingData { field: field.into() }
    }
}

impl From<reqwest::Error> for TimingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TimingError::transport_with_source("request timed out", Box::new(err));
        }
        if err.is_decode() {
            return TimingError::parse("HTTP response body", err.to_string());
        }
        TimingError::transport_with_source("HTTP request failed", Box::new(err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TimingError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        match err {
            // A bad endpoint will not fix itself on reconnect
            tokio_tungstenite::tungstenite::Error::Url(e) => {
                TimingError::parse("WebSocket endpoint", e.to_string())
            }
            other => TimingError::transport_with_source("WebSocket failure", Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for TimingError {
    fn from(err: serde_json::Error) -> Self {
        TimingError::parse("JSON payload", err.to_string())
    }
}
