//! In-memory adapters
//!
//! Mutex-guarded stores for tests and one-shot runs. The queue store claims
//! under its lock, so concurrent dispatchers never share an item.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::core::models::{
    ExportLog, FieldRow, MediaRow, QueueStatus, ReportValidation, WebhookLogEntry,
    WebhookQueueItem,
};
use crate::core::ports::{ExportLogStore, InspectionDataSource, QueueStore, ReportExporter};
use crate::core::services::claim_from;

fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    items: Vec<WebhookQueueItem>,
    logs: Vec<WebhookLogEntry>,
}

/// Webhook queue held in memory
#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    state: Mutex<QueueState>,
}

impl InMemoryQueueStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueueStore for InMemoryQueueStore {
    fn insert(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<WebhookQueueItem> {
        let mut state = lock(&self.state)?;
        state.next_id += 1;
        let item = WebhookQueueItem::new(state.next_id, event_type, payload, priority, now);
        state.items.push(item.clone());
        Ok(item)
    }

    fn claim_batch(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WebhookQueueItem>> {
        let mut state = lock(&self.state)?;
        Ok(claim_from(&mut state.items, limit, now))
    }

    fn update(&self, item: &WebhookQueueItem, expected: QueueStatus) -> anyhow::Result<bool> {
        let mut state = lock(&self.state)?;
        match state.items.iter_mut().find(|stored| stored.id == item.id) {
            Some(stored) if stored.status == expected => {
                *stored = item.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(anyhow::anyhow!("queue item {} not found", item.id)),
        }
    }

    fn get(&self, id: u64) -> anyhow::Result<Option<WebhookQueueItem>> {
        Ok(lock(&self.state)?.items.iter().find(|i| i.id == id).cloned())
    }

    fn list(&self) -> anyhow::Result<Vec<WebhookQueueItem>> {
        Ok(lock(&self.state)?.items.clone())
    }

    fn append_log(&self, entry: WebhookLogEntry) -> anyhow::Result<()> {
        lock(&self.state)?.logs.push(entry);
        Ok(())
    }

    fn logs(&self) -> anyhow::Result<Vec<WebhookLogEntry>> {
        Ok(lock(&self.state)?.logs.clone())
    }
}

#[derive(Debug, Default)]
struct StoredInspection {
    fields: Vec<FieldRow>,
    media: Vec<MediaRow>,
}

/// Inspection rows held in memory
#[derive(Debug, Default)]
pub struct InMemoryInspectionSource {
    inspections: Mutex<BTreeMap<String, StoredInspection>>,
}

impl InMemoryInspectionSource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field value
    pub fn add_field(&self, inspection_id: &str, module: &str, field: &str, value: &str) {
        if let Ok(mut map) = self.inspections.lock() {
            map.entry(inspection_id.to_string())
                .or_default()
                .fields
                .push(FieldRow::new(module, field, value));
        }
    }

    /// Store a captured photo
    pub fn add_photo(&self, inspection_id: &str, module: &str, photo_type: &str, file: &str) {
        if let Ok(mut map) = self.inspections.lock() {
            map.entry(inspection_id.to_string())
                .or_default()
                .media
                .push(MediaRow::new(module, file, photo_type));
        }
    }
}

impl InspectionDataSource for InMemoryInspectionSource {
    fn field_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<FieldRow>> {
        Ok(lock(&self.inspections)?
            .get(inspection_id)
            .map(|i| i.fields.clone())
            .unwrap_or_default())
    }

    fn media_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<MediaRow>> {
        Ok(lock(&self.inspections)?
            .get(inspection_id)
            .map(|i| i.media.clone())
            .unwrap_or_default())
    }

    fn exists(&self, inspection_id: &str) -> anyhow::Result<bool> {
        Ok(lock(&self.inspections)?.contains_key(inspection_id))
    }
}

/// Export records held in memory
#[derive(Debug, Default)]
pub struct InMemoryExportLogStore {
    logs: Mutex<BTreeMap<String, ExportLog>>,
}

impl InMemoryExportLogStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExportLogStore for InMemoryExportLogStore {
    fn get(&self, id: &str) -> anyhow::Result<Option<ExportLog>> {
        Ok(lock(&self.logs)?.get(id).cloned())
    }

    fn save(&self, log: &ExportLog) -> anyhow::Result<()> {
        lock(&self.logs)?.insert(log.id.clone(), log.clone());
        Ok(())
    }

    fn list(&self) -> anyhow::Result<Vec<ExportLog>> {
        Ok(lock(&self.logs)?.values().cloned().collect())
    }
}

/// An email recorded by [`InMemoryExporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Inspection ID
    pub inspection_id: String,
    /// Report link
    pub file_url: String,
    /// Recipients
    pub recipients: Vec<String>,
}

/// Exporter that keeps generated reports and sent emails in memory
#[derive(Debug, Default)]
pub struct InMemoryExporter {
    reports: Mutex<Vec<String>>,
    emails: Mutex<Vec<SentEmail>>,
}

impl InMemoryExporter {
    /// Empty exporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of generated reports
    pub fn reports(&self) -> anyhow::Result<Vec<String>> {
        Ok(lock(&self.reports)?.clone())
    }

    /// Sent emails
    pub fn emails(&self) -> anyhow::Result<Vec<SentEmail>> {
        Ok(lock(&self.emails)?.clone())
    }
}

impl ReportExporter for InMemoryExporter {
    fn generate(
        &self,
        inspection_id: &str,
        _validation: &ReportValidation,
    ) -> anyhow::Result<String> {
        let mut reports = lock(&self.reports)?;
        let path = format!("memory://reports/{inspection_id}-{}", reports.len() + 1);
        reports.push(path.clone());
        Ok(path)
    }

    fn upload(&self, report_path: &str) -> anyhow::Result<String> {
        Ok(report_path.replacen("memory://reports/", "memory://public/", 1))
    }

    fn send_email(
        &self,
        inspection_id: &str,
        file_url: &str,
        recipients: &[String],
    ) -> anyhow::Result<()> {
        lock(&self.emails)?.push(SentEmail {
            inspection_id: inspection_id.to_string(),
            file_url: file_url.to_string(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
