//! Webhook queue
//!
//! Durable queue of outbound events. Items are claimed in priority order
//! (higher first), ties broken by enqueue time.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::core::models::{QueueStats, WebhookLogEntry, WebhookQueueItem};
use crate::core::ports::QueueStore;

/// Claim up to `limit` items from an in-memory item list
///
/// Store adapters call this while holding their lock, which makes the
/// select-then-mark sequence atomic. Claimed items are returned in claim order.
pub fn claim_from(
    items: &mut [WebhookQueueItem],
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<WebhookQueueItem> {
    let mut candidates: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_claimable(now))
        .map(|(idx, _)| idx)
        .collect();

    candidates.sort_by(|&a, &b| {
        let (a, b) = (&items[a], &items[b]);
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut claimed = Vec::new();
    for idx in candidates.into_iter().take(limit) {
        let item = &mut items[idx];
        if item.claim_expired(now) {
            warn!("Taking over webhook #{} claimed at {}", item.id, item.updated_at);
        }
        match item.claim(now) {
            Ok(()) => claimed.push(item.clone()),
            Err(e) => warn!("Skipping unclaimable item: {e}"),
        }
    }
    claimed
}

/// Enqueue and dequeue operations over a [`QueueStore`]
pub struct WebhookQueue<'a> {
    store: &'a dyn QueueStore,
}

impl std::fmt::Debug for WebhookQueue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookQueue").finish_non_exhaustive()
    }
}

impl<'a> WebhookQueue<'a> {
    /// Create a queue over a store
    #[must_use]
    pub fn new(store: &'a dyn QueueStore) -> Self {
        Self { store }
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &'a dyn QueueStore {
        self.store
    }

    /// Insert a pending item and return its ID
    ///
    /// No deduplication: callers put idempotency keys in the payload if needed.
    pub fn enqueue(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        priority: i32,
    ) -> anyhow::Result<u64> {
        let item = self.store.insert(event_type, payload, priority, Utc::now())?;
        debug!("Enqueued {} #{} (priority {})", item.event_type, item.id, item.priority);
        Ok(item.id)
    }

    /// Claim up to `limit` items, marking them `processing`
    pub fn dequeue_batch(&self, limit: usize) -> anyhow::Result<Vec<WebhookQueueItem>> {
        self.dequeue_batch_at(limit, Utc::now())
    }

    /// Claim up to `limit` items as of `now`
    pub fn dequeue_batch_at(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WebhookQueueItem>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.claim_batch(limit, now)
    }

    /// Item counts grouped by status
    pub fn stats(&self) -> anyhow::Result<QueueStats> {
        self.store.stats()
    }

    /// Newest log entries, newest first
    pub fn recent_logs(&self, limit: usize) -> anyhow::Result<Vec<WebhookLogEntry>> {
        self.store.recent_logs(limit)
    }
}
