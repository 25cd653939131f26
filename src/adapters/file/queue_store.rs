//! JSON-file webhook queue
//!
//! Items and delivery logs live in one JSON document. Every operation runs
//! read-modify-write under the file lock, which is what makes claiming
//! atomic across processes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lock::{FileLock, read_json, write_json_atomic};
use crate::core::models::{QueueStatus, WebhookLogEntry, WebhookQueueItem};
use crate::core::ports::QueueStore;
use crate::core::services::claim_from;

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    items: Vec<WebhookQueueItem>,
    #[serde(default)]
    logs: Vec<WebhookLogEntry>,
}

/// Webhook queue persisted as a JSON file
#[derive(Debug, Clone)]
pub struct JsonQueueStore {
    path: PathBuf,
}

impl JsonQueueStore {
    /// Store backed by `path` (created on first write)
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<QueueFile> {
        let _lock = FileLock::acquire(&self.path)?;
        read_json(&self.path)
    }

    fn modify<T>(&self, f: impl FnOnce(&mut QueueFile) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let _lock = FileLock::acquire(&self.path)?;
        let mut file: QueueFile = read_json(&self.path)?;
        let result = f(&mut file)?;
        write_json_atomic(&self.path, &file)?;
        Ok(result)
    }
}

impl QueueStore for JsonQueueStore {
    fn insert(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<WebhookQueueItem> {
        self.modify(|file| {
            // IDs stay monotonic even if the counter was lost
            let max_id = file.items.iter().map(|i| i.id).max().unwrap_or(0);
            file.next_id = file.next_id.max(max_id) + 1;
            let item = WebhookQueueItem::new(file.next_id, event_type, payload, priority, now);
            file.items.push(item.clone());
            Ok(item)
        })
    }

    fn claim_batch(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WebhookQueueItem>> {
        self.modify(|file| Ok(claim_from(&mut file.items, limit, now)))
    }

    fn update(&self, item: &WebhookQueueItem, expected: QueueStatus) -> anyhow::Result<bool> {
        self.modify(|file| {
            match file.items.iter_mut().find(|stored| stored.id == item.id) {
                Some(stored) if stored.status == expected => {
                    *stored = item.clone();
                    Ok(true)
                }
                Some(_) => Ok(false),
                None => anyhow::bail!("Queue item {} not found", item.id),
            }
        })
    }

    fn get(&self, id: u64) -> anyhow::Result<Option<WebhookQueueItem>> {
        Ok(self.read()?.items.into_iter().find(|i| i.id == id))
    }

    fn list(&self) -> anyhow::Result<Vec<WebhookQueueItem>> {
        Ok(self.read()?.items)
    }

    fn append_log(&self, entry: WebhookLogEntry) -> anyhow::Result<()> {
        self.modify(|file| {
            file.logs.push(entry);
            Ok(())
        })
    }

    fn logs(&self) -> anyhow::Result<Vec<WebhookLogEntry>> {
        Ok(self.read()?.logs)
    }
}
