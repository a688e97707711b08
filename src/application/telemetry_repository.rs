// Repository trait for telemetry data access
use crate::domain::reading::{Metric, Reading};
use async_trait::async_trait;
use thiserror::Error;

/// Failure fetching readings for one metric.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("telemetry API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Fetch the flat list of readings for a metric, in the order the API returns them
    async fn fetch_readings(&self, metric: Metric) -> Result<Vec<Reading>, FetchError>;
}
