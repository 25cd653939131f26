//! Queue store port
//!
//! Defines the interface for persisting webhook queue items and delivery logs.

use chrono::{DateTime, Utc};

use super::super::models::{QueueStats, QueueStatus, WebhookLogEntry, WebhookQueueItem};

/// Durable storage for the webhook queue
///
/// This is the only shared mutable resource of the delivery pipeline.
/// Implementations must make [`claim_batch`](Self::claim_batch) and
/// [`update`](Self::update) atomic: concurrent dispatcher runs rely on them
/// as their sole protection against double delivery.
pub trait QueueStore: Send + Sync {
    /// Insert a new pending item, assigning its ID
    fn insert(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<WebhookQueueItem>;

    /// Atomically select up to `limit` claimable items (priority desc,
    /// `created_at` asc) and mark them `processing`
    fn claim_batch(&self, limit: usize, now: DateTime<Utc>)
    -> anyhow::Result<Vec<WebhookQueueItem>>;

    /// Replace a stored item if its stored status still equals `expected`
    ///
    /// Returns `false` when the status no longer matches.
    fn update(&self, item: &WebhookQueueItem, expected: QueueStatus) -> anyhow::Result<bool>;

    /// Fetch one item
    fn get(&self, id: u64) -> anyhow::Result<Option<WebhookQueueItem>>;

    /// All items in ID order
    fn list(&self) -> anyhow::Result<Vec<WebhookQueueItem>>;

    /// Append a delivery log entry
    fn append_log(&self, entry: WebhookLogEntry) -> anyhow::Result<()>;

    /// All log entries, oldest first
    fn logs(&self) -> anyhow::Result<Vec<WebhookLogEntry>>;

    /// Item counts grouped by status
    fn stats(&self) -> anyhow::Result<QueueStats> {
        Ok(QueueStats::from_items(&self.list()?))
    }

    /// The newest `limit` log entries, newest first
    fn recent_logs(&self, limit: usize) -> anyhow::Result<Vec<WebhookLogEntry>> {
        Ok(self.logs()?.into_iter().rev().take(limit).collect())
    }
}
