//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between core business logic
//! and external systems (storage, HTTP endpoints, report rendering).
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The core domain logic depends only on these traits, never on concrete
//! implementations. Validation reads through [`InspectionDataSource`];
//! the webhook queue mutates state only through [`QueueStore`].

mod delivery;
mod export;
mod inspection_source;
mod queue_store;

pub use delivery::{DeliveryRequest, DeliveryResponse, DeliverySink, TransportError};
pub use export::{ExportLogStore, ReportExporter};
pub use inspection_source::InspectionDataSource;
pub use queue_store::QueueStore;
