//! Delivery sink port
//!
//! Defines the interface for posting a payload to an external endpoint.

use std::time::Duration;

use thiserror::Error;

/// A single outbound POST
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRequest {
    /// Target URL
    pub url: String,
    /// Extra headers (auth, event type)
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: serde_json::Value,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Response received from the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl DeliveryResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Delivery failure; every variant is retried the same way
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure
    #[error("network error: {0}")]
    Network(String),

    /// Response with a non-2xx status
    #[error("endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

/// Something that can POST a JSON payload
///
/// Implementations must honour `request.timeout` so one hung endpoint
/// cannot stall a whole batch. Any HTTP response is returned as `Ok`;
/// classifying non-2xx statuses is the caller's job.
pub trait DeliverySink: Send + Sync {
    /// Send one request
    fn post(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError>;
}
