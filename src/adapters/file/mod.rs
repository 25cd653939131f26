//! File-based adapters
//!
//! Implements the storage ports with JSON files under the data directory.

mod export_store;
mod exporter;
mod inspection_source;
mod lock;
mod queue_store;

pub use export_store::JsonExportLogStore;
pub use exporter::LocalExporter;
pub use inspection_source::{InspectionFile, JsonInspectionSource};
pub use lock::{FileLock, read_json, write_json_atomic};
pub use queue_store::JsonQueueStore;
