//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `file/` - JSON-file queue, inspection, export stores and the local exporter
//! - `memory` - Mutex-guarded in-memory stores
//! - `http` - `reqwest` delivery sink (feature `http`)

pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;

pub use file::{JsonExportLogStore, JsonInspectionSource, JsonQueueStore, LocalExporter};
#[cfg(feature = "http")]
pub use http::HttpSink;
pub use memory::{
    InMemoryExportLogStore, InMemoryExporter, InMemoryInspectionSource, InMemoryQueueStore,
    SentEmail,
};
