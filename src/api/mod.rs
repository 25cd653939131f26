//! JSON API over a [`Workspace`](crate::workspace::Workspace)
//!
//! Handlers take typed requests and return `Result<T, ApiError>`. The HTTP
//! server wraps results in [`ApiResponse`], except delivery and retry
//! outcomes, which carry their own `success` and are sent as-is. The CLI
//! calls the same handlers directly.

mod error;
mod handlers;
mod types;

pub use error::{ApiError, ApiErrorData, ErrorCode};
pub use handlers::{
    WEBHOOK_LOG_LIMIT, enqueue_event, get_webhook_config, process_webhook_queue, retry_export,
    test_webhook, validate_report,
};
pub use types::{
    ApiResponse, EnqueueData, EnqueueEventRequest, ProcessQueueData, RetryExportRequest,
    TestWebhookRequest, ValidationData, WebhookConfigData,
};
