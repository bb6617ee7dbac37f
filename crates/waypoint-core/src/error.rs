use thiserror::Error;

/// Failure reported by a single backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// A backend operation that failed on every allowed attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed after {attempts} attempt(s): {last_error}")]
pub struct RetryExhausted {
    pub operation: String,
    pub attempts: u32,
    #[source]
    pub last_error: BackendError,
}

/// Top-level error type for the Waypoint pipeline.
#[derive(Error, Debug)]
pub enum WaypointError {
    #[error("Retrieval failure: {0}")]
    Retrieval(RetryExhausted),

    #[error("Model failure: {0}")]
    Model(RetryExhausted),

    #[error("Prompt assembly failure: {0}")]
    Assembly(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pipeline has been shut down")]
    ShutDown,
}

impl From<config::ConfigError> for WaypointError {
    fn from(e: config::ConfigError) -> Self {
        WaypointError::Config(e.to_string())
    }
}
