//! Business logic services
//!
//! Orchestration logic over domain models. Services reach storage and the
//! network only through the port traits they are handed.
//!
//! - [`rules`] - Resolve cabin-type conditional requirements
//! - [`module_validator`] - Validate one module's data
//! - [`report_validator`] - Decide whether an inspection can produce a report
//! - [`queue`] - Enqueue and claim webhook items
//! - [`dispatcher`] - Deliver claimed items with retry and dead-lettering
//! - [`payload`] - Reshape payloads for each destination
//! - [`events`] - Domain events and their queue priorities
//! - [`export_retry`] - Resume failed report exports

pub mod dispatcher;
pub mod events;
pub mod export_retry;
pub mod module_validator;
pub mod payload;
pub mod queue;
pub mod report_validator;
pub mod rules;

pub use dispatcher::{DispatchOutcome, DispatchPolicy, WebhookDispatcher, build_headers};
pub use events::{
    CorrectiveActionCostChanged, CorrectiveActionHighCriticality, DomainEvent, EventPublisher,
    WorkOrderCreated, WorkOrderPriority, default_priority, sample_payload,
};
pub use export_retry::{
    ExportRetrier, ExportRetryError, ExportRetryOutcome, ensure_retryable, plan_retry,
};
pub use module_validator::{ModuleValidator, OTHER_VALUES, parse_measurement, validate_module};
pub use payload::transform_payload;
pub use queue::{WebhookQueue, claim_from};
pub use report_validator::{
    CriticalCheck, CriticalKind, ReportValidator, ValidationPolicy, evaluate,
};
pub use rules::ConditionalRuleResolver;
