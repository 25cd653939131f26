//! Webhook dispatcher
//!
//! Claims a batch from the queue, delivers each item to the endpoint
//! configured for its target and records the outcome. A failure of one
//! item never aborts the batch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::payload::transform_payload;
use crate::core::models::{
    EndpointConfig, QueueStatus, RetryPolicy, WebhookEndpoints, WebhookLogEntry, WebhookQueueItem,
    WebhookTarget,
};
use crate::core::ports::{DeliveryRequest, DeliverySink, QueueStore, TransportError};

/// Timeout and retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts and backoff
    pub retry: RetryPolicy,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Result of delivering one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    /// Whether the endpoint accepted the event
    pub success: bool,
    /// Queue item, absent for test deliveries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<u64>,
    /// Event type
    pub event_type: String,
    /// Target endpoint
    pub target: WebhookTarget,
    /// Item status after the attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QueueStatus>,
    /// Failed attempts recorded on the item
    pub attempts: u32,
    /// Scheduled retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    /// HTTP status, if a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    /// Error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Delivers queued webhooks
pub struct WebhookDispatcher<'a> {
    store: &'a dyn QueueStore,
    sink: &'a dyn DeliverySink,
    endpoints: &'a WebhookEndpoints,
    policy: DispatchPolicy,
}

impl std::fmt::Debug for WebhookDispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("endpoints", &self.endpoints.presence())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

struct Attempt {
    body: Value,
    response_status: Option<u16>,
    response_body: Option<String>,
    result: Result<(), String>,
}

impl<'a> WebhookDispatcher<'a> {
    /// Create a dispatcher
    #[must_use]
    pub fn new(
        store: &'a dyn QueueStore,
        sink: &'a dyn DeliverySink,
        endpoints: &'a WebhookEndpoints,
        policy: DispatchPolicy,
    ) -> Self {
        Self {
            store,
            sink,
            endpoints,
            policy,
        }
    }

    /// Claim up to `limit` items and deliver them
    ///
    /// Only a failure to claim the batch is an error; delivery failures
    /// are reported per item.
    pub fn process_batch(&self, limit: usize) -> anyhow::Result<Vec<DispatchOutcome>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let items = self.store.claim_batch(limit, Utc::now())?;
        debug!("Claimed {} webhook item(s)", items.len());

        let outcomes: Vec<DispatchOutcome> =
            items.into_iter().map(|item| self.dispatch(item)).collect();
        let delivered = outcomes.iter().filter(|o| o.success).count();
        if !outcomes.is_empty() {
            info!(
                "Processed {} webhook(s): {delivered} delivered, {} failed",
                outcomes.len(),
                outcomes.len() - delivered
            );
        }
        Ok(outcomes)
    }

    /// Deliver one claimed item
    pub fn dispatch(&self, item: WebhookQueueItem) -> DispatchOutcome {
        self.dispatch_at(item, Utc::now())
    }

    /// Deliver one claimed item, using `now` for bookkeeping timestamps
    ///
    /// Items that are not `processing` were never claimed by this run and
    /// are returned untouched, without contacting the endpoint.
    pub fn dispatch_at(&self, mut item: WebhookQueueItem, now: DateTime<Utc>) -> DispatchOutcome {
        let target = WebhookTarget::for_event(&item.event_type);
        if item.status != QueueStatus::Processing {
            warn!("Webhook #{} is {}, not claimed; skipping delivery", item.id, item.status);
            return DispatchOutcome {
                success: false,
                item_id: Some(item.id),
                error: Some(format!("Webhook #{} is {}, not processing", item.id, item.status)),
                event_type: item.event_type,
                target,
                status: Some(item.status),
                attempts: item.attempts,
                next_retry_at: item.next_retry_at,
                response_status: None,
            };
        }
        let attempt_number = item.attempts + 1;

        let endpoint = self.endpoints.get(target);
        let attempt = self.attempt(endpoint, target, &item.event_type, &item.payload);

        // An unconfigured target will not become configured by retrying.
        let transition = match (&attempt.result, endpoint.is_some()) {
            (Ok(()), _) => item.complete(now).map(|()| QueueStatus::Done),
            (Err(reason), false) => item.bury(reason, now).map(|()| QueueStatus::Dead),
            (Err(reason), true) => item.fail(reason, self.policy.retry, now),
        };

        let status = match transition {
            Ok(status) => {
                self.persist(&item);
                Some(status)
            }
            Err(e) => {
                warn!("Webhook #{}: {e}", item.id);
                None
            }
        };

        match &attempt.result {
            Ok(()) => info!("Webhook #{} ({}) delivered to {target}", item.id, item.event_type),
            Err(reason) => warn!("Webhook #{} ({}) failed: {reason}", item.id, item.event_type),
        }

        let entry = WebhookLogEntry {
            item_id: Some(item.id),
            event_type: item.event_type.clone(),
            target: target.name().to_string(),
            attempt: attempt_number,
            success: attempt.result.is_ok(),
            request_payload: attempt.body,
            response_status: attempt.response_status,
            response_body: attempt.response_body,
            error: attempt.result.clone().err(),
            created_at: now,
        };
        if let Err(e) = self.store.append_log(entry) {
            warn!("Could not write webhook log for #{}: {e}", item.id);
        }

        DispatchOutcome {
            success: attempt.result.is_ok(),
            item_id: Some(item.id),
            event_type: item.event_type,
            target,
            status,
            attempts: item.attempts,
            next_retry_at: item.next_retry_at,
            response_status: attempt.response_status,
            error: attempt.result.err(),
        }
    }

    /// Send a sample event straight to a target, bypassing the queue
    ///
    /// The attempt is still written to the delivery log.
    pub fn test_delivery(&self, target: WebhookTarget, payload: &Value) -> DispatchOutcome {
        let event_type = target.sample_event_type();
        let attempt = self.attempt(self.endpoints.get(target), target, event_type, payload);

        let entry = WebhookLogEntry {
            item_id: None,
            event_type: event_type.to_string(),
            target: target.name().to_string(),
            attempt: 1,
            success: attempt.result.is_ok(),
            request_payload: attempt.body,
            response_status: attempt.response_status,
            response_body: attempt.response_body,
            error: attempt.result.clone().err(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.append_log(entry) {
            warn!("Could not write webhook log for test delivery: {e}");
        }

        DispatchOutcome {
            success: attempt.result.is_ok(),
            item_id: None,
            event_type: event_type.to_string(),
            target,
            status: None,
            attempts: 0,
            next_retry_at: None,
            response_status: attempt.response_status,
            error: attempt.result.err(),
        }
    }

    fn attempt(
        &self,
        endpoint: Option<&EndpointConfig>,
        target: WebhookTarget,
        event_type: &str,
        payload: &Value,
    ) -> Attempt {
        match endpoint {
            Some(endpoint) => self.deliver(endpoint, event_type, payload),
            None => Attempt {
                body: payload.clone(),
                response_status: None,
                response_body: None,
                result: Err(format!("Webhook {target} not configured")),
            },
        }
    }

    fn deliver(&self, endpoint: &EndpointConfig, event_type: &str, payload: &Value) -> Attempt {
        let body = transform_payload(event_type, payload);
        let request = DeliveryRequest {
            url: endpoint.url.clone(),
            headers: build_headers(endpoint, event_type),
            body: body.clone(),
            timeout: self.policy.timeout,
        };

        let (response_status, response_body, result) = match self.sink.post(&request) {
            Ok(response) if response.is_success() => {
                (Some(response.status), Some(response.body), Ok(()))
            }
            Ok(response) => {
                let err = TransportError::Status {
                    status: response.status,
                    body: response.body.clone(),
                };
                (Some(response.status), Some(response.body), Err(err.to_string()))
            }
            Err(err) => {
                let status = match &err {
                    TransportError::Status { status, .. } => Some(*status),
                    _ => None,
                };
                (status, None, Err(err.to_string()))
            }
        };

        Attempt {
            body,
            response_status,
            response_body,
            result,
        }
    }

    fn persist(&self, item: &WebhookQueueItem) {
        match self.store.update(item, QueueStatus::Processing) {
            Ok(true) => {}
            Ok(false) => warn!("Webhook #{} changed while in flight; result not stored", item.id),
            Err(e) => warn!("Could not store webhook #{}: {e}", item.id),
        }
    }
}

/// Headers for one delivery
///
/// Configured extra headers are applied last and may override the defaults.
#[must_use]
pub fn build_headers(endpoint: &EndpointConfig, event_type: &str) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("X-Webhook-Event".to_string(), event_type.to_string()),
    ];
    if let Some(key) = endpoint.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        headers.push(("Authorization".to_string(), format!("Bearer {key}")));
    }
    for (name, value) in &endpoint.headers {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }
    headers
}
