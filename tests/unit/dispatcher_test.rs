//! Webhook delivery, retry and dead-lettering

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde_json::json;
use vistoria::adapters::InMemoryQueueStore;
use vistoria::core::models::{
    EndpointConfig, QueueStatus, WebhookEndpoints, WebhookQueueItem, WebhookTarget,
};
use vistoria::core::ports::{QueueStore, TransportError};
use vistoria::core::services::{DispatchPolicy, WebhookDispatcher};

use crate::common::MockSink;

fn endpoints() -> WebhookEndpoints {
    WebhookEndpoints::default()
        .with(
            WebhookTarget::WorkOrder,
            EndpointConfig::new("https://os.example.com/hook").with_api_key("k1"),
        )
        .with(WebhookTarget::Notification, EndpointConfig::new("https://alerts.example.com/hook"))
}

fn claim_one(store: &InMemoryQueueStore, at: chrono::DateTime<Utc>) -> WebhookQueueItem {
    let mut batch = store.claim_batch(1, at).unwrap();
    assert_eq!(batch.len(), 1, "nothing claimable at {at}");
    batch.remove(0)
}

#[test]
fn success_marks_done_and_logs() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new().respond(201, "created");
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let payload = json!({ "os_number": "123", "priority": "urgent", "inspection_id": "i-1" });
    store.insert("work_order_created", payload, 5, Utc::now()).unwrap();
    let outcomes = dispatcher.process_batch(10).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].success);
    assert_eq!(outcomes[0].status, Some(QueueStatus::Done));
    assert_eq!(outcomes[0].response_status, Some(201));

    let request = &sink.requests()[0];
    assert_eq!(request.url, "https://os.example.com/hook");
    assert_eq!(request.timeout, StdDuration::from_secs(30));
    assert_eq!(request.body["title"], "OS 123");
    assert_eq!(request.body["priority"], "HIGH");
    assert_eq!(request.body["reference"]["inspection_id"], "i-1");
    assert!(request.headers.contains(&("Authorization".to_string(), "Bearer k1".to_string())));
    assert!(
        request
            .headers
            .contains(&("X-Webhook-Event".to_string(), "work_order_created".to_string()))
    );

    let logs = store.logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].success);
    assert_eq!(logs[0].response_body.as_deref(), Some("created"));
    assert_eq!(logs[0].target, "work_order");
}

#[test]
fn server_error_schedules_linear_backoff() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new().respond(500, "boom");
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let now = Utc::now();
    store.insert("work_order_created", json!({}), 0, now).unwrap();
    let outcome = dispatcher.dispatch_at(claim_one(&store, now), now);

    assert!(!outcome.success);
    assert_eq!(outcome.status, Some(QueueStatus::Failed));
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.next_retry_at, Some(now + Duration::minutes(5)));
    assert_eq!(outcome.response_status, Some(500));

    // Not claimable until the retry time.
    assert!(store.claim_batch(1, now + Duration::minutes(4)).unwrap().is_empty());

    let log = &store.logs().unwrap()[0];
    assert!(!log.success);
    assert_eq!(log.response_status, Some(500));
    assert!(log.error.as_deref().unwrap().contains("500"));
}

#[test]
fn third_failure_dead_letters() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new()
        .respond(503, "")
        .fail(TransportError::Network("connection refused".to_string()))
        .respond(500, "");
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let start = Utc::now();
    store.insert("work_order_created", json!({}), 0, start).unwrap();

    let first = dispatcher.dispatch_at(claim_one(&store, start), start);
    assert_eq!(first.status, Some(QueueStatus::Failed));

    let later = start + Duration::hours(1);
    let second = dispatcher.dispatch_at(claim_one(&store, later), later);
    assert_eq!(second.status, Some(QueueStatus::Failed));
    assert_eq!(second.attempts, 2);
    assert_eq!(second.next_retry_at, Some(later + Duration::minutes(10)));

    let last = start + Duration::hours(2);
    let third = dispatcher.dispatch_at(claim_one(&store, last), last);
    assert_eq!(third.status, Some(QueueStatus::Dead));
    assert_eq!(third.attempts, 3);
    assert_eq!(third.next_retry_at, None);

    assert!(store.claim_batch(1, last + Duration::days(1)).unwrap().is_empty());
    let attempts: Vec<u32> = store.logs().unwrap().iter().map(|l| l.attempt).collect();
    assert_eq!(attempts, vec![1, 2, 3]);
}

#[test]
fn timeout_counts_as_failure() {
    let store = InMemoryQueueStore::new();
    let timeout = StdDuration::from_secs(2);
    let sink = MockSink::new().fail(TransportError::Timeout(timeout));
    let endpoints = endpoints();
    let policy = DispatchPolicy {
        timeout,
        ..DispatchPolicy::default()
    };
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, policy);

    store.insert("corrective_action_high_criticality", json!({}), 8, Utc::now()).unwrap();
    let outcome = dispatcher.process_batch(10).unwrap().remove(0);

    assert_eq!(outcome.status, Some(QueueStatus::Failed));
    assert!(outcome.error.unwrap().contains("timed out"));
    assert_eq!(sink.requests()[0].timeout, timeout);
}

#[test]
fn unconfigured_target_is_dead_without_request() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new();
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    store.insert("corrective_action_cost_changed", json!({}), 2, Utc::now()).unwrap();
    let outcome = dispatcher.process_batch(10).unwrap().remove(0);

    assert!(!outcome.success);
    assert_eq!(outcome.target, WebhookTarget::CostTracking);
    assert_eq!(outcome.status, Some(QueueStatus::Dead));
    assert_eq!(outcome.attempts, 0);
    assert!(sink.requests().is_empty());
    assert!(store.logs().unwrap()[0].error.as_deref().unwrap().contains("not configured"));
}

#[test]
fn one_failure_does_not_abort_the_batch() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new().respond(500, "").respond(200, "ok");
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let now = Utc::now();
    store.insert("work_order_created", json!({}), 5, now).unwrap();
    store.insert("something_else", json!({ "raw": true }), 1, now).unwrap();

    let outcomes = dispatcher.process_batch(10).unwrap();
    let statuses: Vec<_> = outcomes.iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![Some(QueueStatus::Failed), Some(QueueStatus::Done)]);

    // Unknown events go to notifications with the payload untouched.
    let second = &sink.requests()[1];
    assert_eq!(second.url, "https://alerts.example.com/hook");
    assert_eq!(second.body, json!({ "raw": true }));
}

#[test]
fn test_delivery_bypasses_queue() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new();
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let outcome = dispatcher.test_delivery(WebhookTarget::Notification, &json!({ "descricao": "x" }));
    assert!(outcome.success);
    assert_eq!(outcome.item_id, None);
    assert_eq!(outcome.event_type, "corrective_action_high_criticality");
    assert_eq!(store.stats().unwrap().total, 0);

    let logs = store.logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].item_id, None);
}

#[test]
fn unclaimed_item_is_not_delivered() {
    let store = InMemoryQueueStore::new();
    let sink = MockSink::new();
    let endpoints = endpoints();
    let dispatcher = WebhookDispatcher::new(&store, &sink, &endpoints, DispatchPolicy::default());

    let pending = store.insert("work_order_created", json!({}), 5, Utc::now()).unwrap();
    let outcome = dispatcher.dispatch(pending.clone());

    assert!(!outcome.success);
    assert_eq!(outcome.status, Some(QueueStatus::Pending));
    assert!(outcome.error.unwrap().contains("not processing"));
    assert!(sink.requests().is_empty());
    assert!(store.logs().unwrap().is_empty());
    assert_eq!(store.get(pending.id).unwrap().unwrap(), pending);
}
