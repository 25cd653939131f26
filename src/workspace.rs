//! Runtime wiring
//!
//! A [`Workspace`] owns the configuration, the module schema and one
//! adapter per port. The CLI and the HTTP server both operate on it.

use std::path::{Path, PathBuf};

use log::debug;

use crate::adapters::{
    InMemoryExportLogStore, InMemoryExporter, InMemoryInspectionSource, InMemoryQueueStore,
    JsonExportLogStore, JsonInspectionSource, JsonQueueStore, LocalExporter,
};
use crate::config::AppConfig;
use crate::core::models::Schema;
use crate::core::ports::{
    DeliveryRequest, DeliveryResponse, DeliverySink, ExportLogStore, InspectionDataSource,
    QueueStore, ReportExporter, TransportError,
};
use crate::core::services::{
    EventPublisher, ExportRetrier, ReportValidator, WebhookDispatcher, WebhookQueue,
};
use crate::paths;

/// Sink used when no HTTP transport is available
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSink;

impl DeliverySink for OfflineSink {
    fn post(&self, _request: &DeliveryRequest) -> Result<DeliveryResponse, TransportError> {
        Err(TransportError::Network("HTTP transport not available".to_string()))
    }
}

/// Configuration, schema and adapters of one data directory
pub struct Workspace {
    data_dir: Option<PathBuf>,
    config: AppConfig,
    schema: Schema,
    queue_store: Box<dyn QueueStore>,
    inspections: Box<dyn InspectionDataSource>,
    exports: Box<dyn ExportLogStore>,
    exporter: Box<dyn ReportExporter>,
    sink: Box<dyn DeliverySink>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Open a data directory with JSON-file adapters
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let config = AppConfig::load(data_dir)?;
        let schema = config.schema(data_dir)?;
        debug!("Opened workspace {} ({} modules)", data_dir.display(), schema.modules().len());

        Ok(Self {
            data_dir: Some(data_dir.to_path_buf()),
            queue_store: Box::new(JsonQueueStore::new(&paths::queue_file(data_dir))),
            inspections: Box::new(JsonInspectionSource::new(&paths::inspections_dir(data_dir))),
            exports: Box::new(JsonExportLogStore::new(&paths::exports_file(data_dir))),
            exporter: Box::new(LocalExporter::new(
                &paths::reports_dir(data_dir),
                &paths::public_dir(data_dir),
                &paths::outbox_dir(data_dir),
            )),
            sink: default_sink()?,
            config,
            schema,
        })
    }

    /// Workspace with in-memory adapters and no HTTP transport
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        let schema = Schema::builtin()?;
        config.validation.check_against(&schema)?;
        Ok(Self {
            data_dir: None,
            config,
            schema,
            queue_store: Box::new(InMemoryQueueStore::new()),
            inspections: Box::new(InMemoryInspectionSource::new()),
            exports: Box::new(InMemoryExportLogStore::new()),
            exporter: Box::new(InMemoryExporter::new()),
            sink: Box::new(OfflineSink),
        })
    }

    /// Replace the delivery sink
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn DeliverySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the inspection data source
    #[must_use]
    pub fn with_inspections(mut self, source: Box<dyn InspectionDataSource>) -> Self {
        self.inspections = source;
        self
    }

    /// Replace the export record store
    #[must_use]
    pub fn with_exports(mut self, store: Box<dyn ExportLogStore>) -> Self {
        self.exports = store;
        self
    }

    /// Replace the report exporter
    #[must_use]
    pub fn with_exporter(mut self, exporter: Box<dyn ReportExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    /// Replace the module schema
    pub fn with_schema(mut self, schema: Schema) -> anyhow::Result<Self> {
        self.config.validation.check_against(&schema)?;
        self.schema = schema;
        Ok(self)
    }

    /// Data directory, if file-backed
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable configuration; call [`save_config`](Self::save_config) to persist
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Persist the configuration (no-op for in-memory workspaces)
    pub fn save_config(&self) -> anyhow::Result<()> {
        match &self.data_dir {
            Some(dir) => self.config.save(dir),
            None => Ok(()),
        }
    }

    /// Module schema
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Inspection data source
    #[must_use]
    pub fn inspections(&self) -> &dyn InspectionDataSource {
        self.inspections.as_ref()
    }

    /// Export record store
    #[must_use]
    pub fn exports(&self) -> &dyn ExportLogStore {
        self.exports.as_ref()
    }

    /// Webhook queue store
    #[must_use]
    pub fn queue_store(&self) -> &dyn QueueStore {
        self.queue_store.as_ref()
    }

    /// Webhook queue
    #[must_use]
    pub fn queue(&self) -> WebhookQueue<'_> {
        WebhookQueue::new(self.queue_store.as_ref())
    }

    /// Webhook dispatcher using the configured endpoints and policy
    #[must_use]
    pub fn dispatcher(&self) -> WebhookDispatcher<'_> {
        WebhookDispatcher::new(
            self.queue_store.as_ref(),
            self.sink.as_ref(),
            &self.config.webhooks,
            self.config.dispatcher.policy(),
        )
    }

    /// Report validator over the inspection data source
    #[must_use]
    pub fn report_validator(&self) -> ReportValidator<'_> {
        ReportValidator::new(&self.schema, &self.config.validation, self.inspections.as_ref())
    }

    /// Run `f` with an event publisher over this workspace's queue
    pub fn with_publisher<T>(&self, f: impl FnOnce(&EventPublisher<'_>) -> T) -> T {
        let queue = self.queue();
        f(&EventPublisher::new(&queue))
    }

    /// Run `f` with an export retrier
    pub fn with_retrier<T>(&self, f: impl FnOnce(&ExportRetrier<'_>) -> T) -> T {
        let validator = self.report_validator();
        f(&ExportRetrier::new(self.exports.as_ref(), self.exporter.as_ref(), &validator))
    }
}

#[cfg(feature = "http")]
fn default_sink() -> anyhow::Result<Box<dyn DeliverySink>> {
    Ok(Box::new(crate::adapters::HttpSink::new()?))
}

#[cfg(not(feature = "http"))]
#[allow(clippy::unnecessary_wraps)]
fn default_sink() -> anyhow::Result<Box<dyn DeliverySink>> {
    Ok(Box::new(OfflineSink))
}
