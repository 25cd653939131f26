//! Webhook queue ordering and claim atomicity

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use serde_json::json;
use vistoria::adapters::{InMemoryQueueStore, JsonQueueStore};
use vistoria::core::models::{CLAIM_LEASE_MINUTES, QueueStatus};
use vistoria::core::ports::QueueStore;
use vistoria::core::services::{EventPublisher, WebhookQueue, WorkOrderCreated};

const ITEMS: usize = 24;
const WORKERS: usize = 6;

/// Claim everything from `stores` in parallel and return all claimed IDs
fn claim_concurrently<S: QueueStore + 'static>(stores: Vec<Arc<S>>) -> Vec<u64> {
    let handles: Vec<_> = stores
        .into_iter()
        .map(|store| {
            thread::spawn(move || {
                let mut ids = Vec::new();
                loop {
                    let batch = store.claim_batch(3, Utc::now()).unwrap();
                    if batch.is_empty() {
                        break;
                    }
                    ids.extend(batch.iter().map(|i| i.id));
                }
                ids
            })
        })
        .collect();

    handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
}

fn assert_claimed_once(ids: &[u64]) {
    let unique: BTreeSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "an item was claimed twice: {ids:?}");
    assert_eq!(ids.len(), ITEMS);
}

#[test]
fn concurrent_claims_never_share_an_item_in_memory() {
    let store = Arc::new(InMemoryQueueStore::new());
    for n in 0..ITEMS {
        store.insert("evt", json!({ "n": n }), 0, Utc::now()).unwrap();
    }

    let ids = claim_concurrently((0..WORKERS).map(|_| Arc::clone(&store)).collect());
    assert_claimed_once(&ids);
    assert_eq!(store.stats().unwrap().processing, ITEMS);
}

#[test]
fn concurrent_claims_never_share_an_item_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let seed = JsonQueueStore::new(&path);
    for n in 0..ITEMS {
        seed.insert("evt", json!({ "n": n }), 0, Utc::now()).unwrap();
    }

    // Separate store instances share only the file, like separate processes.
    let stores = (0..WORKERS).map(|_| Arc::new(JsonQueueStore::new(&path))).collect();
    let ids = claim_concurrently(stores);
    assert_claimed_once(&ids);
    assert_eq!(seed.stats().unwrap().processing, ITEMS);
}

#[test]
fn higher_priority_is_claimed_first() {
    let store = InMemoryQueueStore::new();
    let queue = WebhookQueue::new(&store);

    let work_order = queue
        .enqueue("work_order_created", json!({ "os_number": "OS-1" }), 5)
        .unwrap();
    queue.enqueue("notification", json!({ "text": "hi" }), 1).unwrap();

    let batch = queue.dequeue_batch(1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, work_order);
    assert_eq!(batch[0].event_type, "work_order_created");
    assert_eq!(batch[0].status, QueueStatus::Processing);
}

#[test]
fn same_priority_is_fifo() {
    let store = InMemoryQueueStore::new();
    let now = Utc::now();
    let first = store.insert("a", json!({}), 2, now).unwrap();
    let second = store.insert("b", json!({}), 2, now + Duration::seconds(1)).unwrap();

    let ids: Vec<u64> = store
        .claim_batch(10, now + Duration::seconds(2))
        .unwrap()
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn zero_limit_claims_nothing() {
    let store = InMemoryQueueStore::new();
    let queue = WebhookQueue::new(&store);
    queue.enqueue("evt", json!({}), 0).unwrap();
    assert!(queue.dequeue_batch(0).unwrap().is_empty());
    assert_eq!(queue.stats().unwrap().pending, 1);
}

#[test]
fn enqueue_does_not_deduplicate() {
    let store = InMemoryQueueStore::new();
    let queue = WebhookQueue::new(&store);
    let a = queue.enqueue("evt", json!({ "k": 1 }), 0).unwrap();
    let b = queue.enqueue("evt", json!({ "k": 1 }), 0).unwrap();
    assert_ne!(a, b);
    assert_eq!(queue.stats().unwrap().total, 2);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let id = WebhookQueue::new(&JsonQueueStore::new(&path))
        .enqueue("evt", json!({ "x": 1 }), 3)
        .unwrap();

    let reopened = JsonQueueStore::new(&path);
    let item = reopened.get(id).unwrap().unwrap();
    assert_eq!(item.priority, 3);
    assert_eq!(item.payload, json!({ "x": 1 }));
    assert_eq!(item.status, QueueStatus::Pending);
}

#[test]
fn abandoned_claims_are_taken_over_after_lease() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let start = Utc::now();

    let crashed = JsonQueueStore::new(&path);
    crashed.insert("work_order_created", json!({}), 5, start).unwrap();
    crashed.insert("work_order_created", json!({}), 5, start).unwrap();
    assert_eq!(crashed.claim_batch(10, start).unwrap().len(), 2);

    let next_run = JsonQueueStore::new(&path);
    let within_lease = start + Duration::minutes(CLAIM_LEASE_MINUTES - 1);
    assert!(next_run.claim_batch(10, within_lease).unwrap().is_empty());

    let after_lease = start + Duration::minutes(CLAIM_LEASE_MINUTES);
    let reclaimed = next_run.claim_batch(10, after_lease).unwrap();
    assert_eq!(reclaimed.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(reclaimed.iter().all(|i| i.status == QueueStatus::Processing && i.attempts == 0));
}

#[test]
fn publisher_uses_event_priority() {
    let store = InMemoryQueueStore::new();
    let queue = WebhookQueue::new(&store);
    let publisher = EventPublisher::new(&queue);

    let event = WorkOrderCreated {
        os_number: "OS-7".to_string(),
        inspection_id: "insp-1".to_string(),
        fault_id: None,
        description: "Trocar disjuntor".to_string(),
        priority: "low".to_string(),
        estimated_cost: None,
        assigned_to: None,
        created_at: Utc::now(),
    };
    let id = publisher.publish(&event).unwrap();

    let item = store.get(id).unwrap().unwrap();
    assert_eq!(item.event_type, "work_order_created");
    assert_eq!(item.priority, 1);
    assert_eq!(item.payload["os_number"], "OS-7");
}
