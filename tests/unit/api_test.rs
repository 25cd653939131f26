//! API handlers over an in-memory workspace

use serde_json::json;
use vistoria::api::{
    self, ApiResponse, EnqueueEventRequest, TestWebhookRequest, WEBHOOK_LOG_LIMIT,
};
use vistoria::config::AppConfig;
use vistoria::core::models::{EndpointConfig, QueueStatus, WebhookTarget};
use vistoria::workspace::Workspace;

use crate::common::{MockSink, complete_source};

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.webhooks = config
        .webhooks
        .with(WebhookTarget::WorkOrder, EndpointConfig::new("https://os.example.com/hook"));
    config
}

fn workspace(sink: MockSink) -> Workspace {
    Workspace::in_memory(config())
        .unwrap()
        .with_sink(Box::new(sink))
        .with_inspections(Box::new(complete_source("insp-1", "POSTE")))
}

fn test_request(name: &str) -> TestWebhookRequest {
    TestWebhookRequest {
        webhook_name: name.to_string(),
        test_data: None,
    }
}

#[test]
fn webhook_config_reports_presence_without_secrets() {
    let ws = workspace(MockSink::new());
    let data = api::get_webhook_config(&ws).unwrap();

    assert!(data.webhooks["work_order"]);
    assert!(!data.webhooks["notification"]);
    assert!(!data.webhooks["cost_tracking"]);
    assert_eq!(data.queue.total, 0);

    let value = serde_json::to_value(&data).unwrap();
    assert!(!value.to_string().contains("os.example.com"));
}

#[test]
fn webhook_config_keeps_last_ten_logs_newest_first() {
    let ws = workspace(MockSink::new());
    for n in 0..12 {
        let req = TestWebhookRequest {
            webhook_name: "work_order".to_string(),
            test_data: Some(json!({ "os_number": n.to_string() })),
        };
        api::test_webhook(&ws, req).unwrap();
    }

    let logs = api::get_webhook_config(&ws).unwrap().recent_logs;
    assert_eq!(logs.len(), WEBHOOK_LOG_LIMIT);
    assert_eq!(logs[0].request_payload["external_id"], "11");
    assert_eq!(logs[9].request_payload["external_id"], "2");
}

#[test]
fn test_webhook_sends_sample_payload() {
    let ws = workspace(MockSink::new().respond(202, "accepted"));
    let outcome = api::test_webhook(&ws, test_request("work-order")).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.response_status, Some(202));
    assert_eq!(outcome.event_type, "work_order_created");
}

#[test]
fn test_webhook_reports_http_failure() {
    let ws = workspace(MockSink::new().respond(401, "unauthorized"));
    let outcome = api::test_webhook(&ws, test_request("work_order")).unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.response_status, Some(401));
}

#[test]
fn test_webhook_unconfigured_is_not_an_error() {
    let ws = workspace(MockSink::new());
    let outcome = api::test_webhook(&ws, test_request("cost_tracking")).unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Webhook cost_tracking not configured"));
}

#[test]
fn process_queue_respects_batch_size() {
    let mut ws = workspace(MockSink::new());
    ws.config_mut().dispatcher.batch_size = 2;
    for n in 0..3 {
        let req = EnqueueEventRequest {
            event_type: "work_order_created".to_string(),
            payload: json!({ "os_number": n }),
            priority: Some(0),
        };
        api::enqueue_event(&ws, req).unwrap();
    }

    let data = api::process_webhook_queue(&ws).unwrap();
    assert_eq!(data.processed, 2);
    assert!(data.results.iter().all(|r| r.status == Some(QueueStatus::Done)));

    let stats = api::get_webhook_config(&ws).unwrap().queue;
    assert_eq!(stats.done, 2);
    assert_eq!(stats.pending, 1);
}

#[test]
fn enqueue_uses_work_order_priority() {
    let ws = workspace(MockSink::new());
    let req = EnqueueEventRequest {
        event_type: "work_order_created".to_string(),
        payload: json!({ "priority": "urgent" }),
        priority: None,
    };
    assert_eq!(api::enqueue_event(&ws, req).unwrap().priority, 5);

    let req = EnqueueEventRequest {
        event_type: "custom_event".to_string(),
        payload: json!({}),
        priority: None,
    };
    assert_eq!(api::enqueue_event(&ws, req).unwrap().priority, 0);
}

#[test]
fn validation_of_complete_inspection() {
    let ws = workspace(MockSink::new());
    let data = api::validate_report(&ws, "insp-1").unwrap();
    assert!(data.can_generate);

    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["inspection_id"], "insp-1");
    assert_eq!(value["isValid"], true);
    assert_eq!(value["missingFields"], json!([]));
}

#[test]
fn envelope_shapes() {
    let ok = serde_json::to_value(ApiResponse::success(json!({ "n": 1 }))).unwrap();
    assert_eq!(ok, json!({ "success": true, "n": 1 }));

    let run = api::ProcessQueueData {
        processed: 0,
        results: vec![],
    };
    let run = serde_json::to_value(ApiResponse::success(run)).unwrap();
    assert_eq!(run, json!({ "success": true, "processed": 0, "results": [] }));

    let err = serde_json::to_value(ApiResponse::<()>::error("BAD_REQUEST", "nope")).unwrap();
    assert_eq!(
        err,
        json!({ "success": false, "error": { "code": "BAD_REQUEST", "message": "nope" } })
    );
}
