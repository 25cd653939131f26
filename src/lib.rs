//! vistoria - Validation and webhook delivery engine for field inspections
//!
//! This library decides whether an inspection is complete enough to produce
//! a final report, and delivers inspection events to external systems
//! through a durable, prioritized webhook queue with retries.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
#![warn(missing_docs, missing_debug_implementations)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod output;
pub mod paths;
pub mod workspace;
