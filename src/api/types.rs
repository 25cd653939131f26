//! API request and response types
//!
//! All types are framework-agnostic and can be used by any client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiErrorData};
use crate::core::models::{QueueStats, ReportValidation, WebhookLogEntry};
use crate::core::services::DispatchOutcome;

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Response envelope: `success` beside the handler's own fields
///
/// Data fields are flattened to the top level, so a queue run reads
/// `{"success": true, "processed": 2, "results": [...]}`. Results that
/// already carry their own `success` ([`DispatchOutcome`],
/// [`ExportRetryOutcome`](crate::core::services::ExportRetryOutcome)) are
/// sent as-is instead; a rejected test delivery is still a well-formed
/// request, so it answers HTTP 200 with `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response fields (present on success)
    #[serde(flatten)]
    pub data: Option<T>,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorData>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response
    #[must_use]
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorData {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

impl From<&ApiError> for ApiResponse<()> {
    fn from(error: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorData::from(error)),
        }
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for a test delivery
#[derive(Debug, Deserialize)]
pub struct TestWebhookRequest {
    /// Target name: `work_order`, `notification` or `cost_tracking`
    pub webhook_name: String,
    /// Payload to send instead of the built-in sample
    #[serde(default)]
    pub test_data: Option<serde_json::Value>,
}

/// Request body for retrying an export
#[derive(Debug, Deserialize)]
pub struct RetryExportRequest {
    /// Export record ID
    pub export_log_id: String,
}

/// Request body for enqueueing an event
#[derive(Debug, Deserialize)]
pub struct EnqueueEventRequest {
    /// Event type, e.g. `work_order_created`
    pub event_type: String,
    /// Event payload
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Queue priority; derived from the event when absent
    #[serde(default)]
    pub priority: Option<i32>,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Endpoint presence, queue counts and recent attempts
#[derive(Debug, Serialize)]
pub struct WebhookConfigData {
    /// Whether each target has a URL configured
    pub webhooks: BTreeMap<&'static str, bool>,
    /// Queue counts by status
    pub queue: QueueStats,
    /// Last delivery attempts, newest first
    pub recent_logs: Vec<WebhookLogEntry>,
}

/// Result of a dispatcher run
#[derive(Debug, Serialize)]
pub struct ProcessQueueData {
    /// Items processed
    pub processed: usize,
    /// Per-item outcomes
    pub results: Vec<DispatchOutcome>,
}

/// Report validation of one inspection
#[derive(Debug, Serialize)]
pub struct ValidationData {
    /// Inspection ID
    pub inspection_id: String,
    /// Whether a report may be generated
    pub can_generate: bool,
    /// Validation details
    #[serde(flatten)]
    pub validation: ReportValidation,
}

/// Result of enqueueing an event
#[derive(Debug, Serialize)]
pub struct EnqueueData {
    /// Queue item ID
    pub id: u64,
    /// Event type
    pub event_type: String,
    /// Assigned priority
    pub priority: i32,
}
