//! Domain models for vistoria
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Schema`] - Module descriptors and cabin-type rules
//! - [`ModuleData`] - What was entered for one module
//! - [`ReportValidation`] - Whether an inspection can produce a report
//! - [`WebhookQueueItem`] - An outbound event awaiting delivery
//! - [`ExportLog`] - A report export and the stage it reached

mod cabin_rule;
mod endpoint;
mod export;
mod module_data;
mod schema;
mod validation;
mod webhook;

pub use cabin_rule::{CabinRuleTable, ConditionalItems};
pub use endpoint::{EndpointConfig, WebhookEndpoints, WebhookTarget};
pub use export::{ExportLog, ExportStage, ExportStatus, MAX_EXPORT_RETRIES, RetryMode};
pub use module_data::{FieldRow, InspectionSnapshot, MediaRow, ModuleData};
pub use schema::{
    CabinFieldRef, FieldSpec, FieldType, MeasurementSpec, ModuleConfig, PhotoSpec, Schema,
    SchemaError,
};
pub use validation::{
    IssueKind, ModuleValidation, ReportValidation, ValidationIssue, critical_sentence,
    is_classified_message, missing_module_entry, missing_module_sentence,
};
pub use webhook::{
    CLAIM_LEASE_MINUTES, QueueError, QueueStats, QueueStatus, RetryPolicy, WebhookLogEntry, WebhookQueueItem,
};
