//! Pure API handlers
//!
//! These handlers contain business logic and are HTTP-agnostic.
//! They take the workspace plus typed input and return `Result<T, ApiError>`.

use log::info;

use crate::core::models::WebhookTarget;
use crate::core::services::{
    DispatchOutcome, ExportRetryOutcome, default_priority, sample_payload,
};
use crate::workspace::Workspace;

use super::error::ApiError;
use super::types::{
    EnqueueData, EnqueueEventRequest, ProcessQueueData, RetryExportRequest, TestWebhookRequest,
    ValidationData, WebhookConfigData,
};

/// Log entries returned by [`get_webhook_config`]
pub const WEBHOOK_LOG_LIMIT: usize = 10;

// =============================================================================
// WEBHOOKS
// =============================================================================

/// Send one test event straight to a named target
///
/// An unconfigured target is reported in the outcome, not as an error.
pub fn test_webhook(ws: &Workspace, req: TestWebhookRequest) -> Result<DispatchOutcome, ApiError> {
    let target: WebhookTarget = req
        .webhook_name
        .trim()
        .parse()
        .map_err(ApiError::bad_request)?;

    let payload = req.test_data.unwrap_or_else(|| sample_payload(target));
    info!("Test delivery to {target}");
    Ok(ws.dispatcher().test_delivery(target, &payload))
}

/// Endpoint presence, queue counts and the latest delivery attempts
pub fn get_webhook_config(ws: &Workspace) -> Result<WebhookConfigData, ApiError> {
    let queue = ws.queue();
    Ok(WebhookConfigData {
        webhooks: ws.config().webhooks.presence(),
        queue: queue.stats()?,
        recent_logs: queue.recent_logs(WEBHOOK_LOG_LIMIT)?,
    })
}

/// Dispatch one batch of due items
pub fn process_webhook_queue(ws: &Workspace) -> Result<ProcessQueueData, ApiError> {
    let results = ws.dispatcher().process_batch(ws.config().dispatcher.batch_size)?;
    Ok(ProcessQueueData {
        processed: results.len(),
        results,
    })
}

/// Enqueue an event for later delivery
pub fn enqueue_event(ws: &Workspace, req: EnqueueEventRequest) -> Result<EnqueueData, ApiError> {
    let event_type = req.event_type.trim();
    if event_type.is_empty() {
        return Err(ApiError::bad_request("event_type is required"));
    }

    let priority = req.priority.unwrap_or_else(|| default_priority(event_type, &req.payload));
    let id = ws.queue().enqueue(event_type, req.payload, priority)?;
    Ok(EnqueueData {
        id,
        event_type: event_type.to_string(),
        priority,
    })
}

// =============================================================================
// EXPORTS
// =============================================================================

/// Re-drive a failed export
pub fn retry_export(
    ws: &Workspace,
    req: RetryExportRequest,
) -> Result<ExportRetryOutcome, ApiError> {
    let id = req.export_log_id.trim();
    if id.is_empty() {
        return Err(ApiError::bad_request("export_log_id is required"));
    }
    ws.with_retrier(|retrier| retrier.retry(id)).map_err(ApiError::from)
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Report validation for one inspection
pub fn validate_report(ws: &Workspace, inspection_id: &str) -> Result<ValidationData, ApiError> {
    if !ws.inspections().exists(inspection_id)? {
        return Err(ApiError::not_found(format!("Inspection {inspection_id} not found")));
    }

    let validation = ws.report_validator().validate_final_report(inspection_id)?;
    Ok(ValidationData {
        inspection_id: inspection_id.to_string(),
        can_generate: validation.can_generate(),
        validation,
    })
}
