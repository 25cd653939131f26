//! vistoria - Validation and webhook delivery engine for field inspections
//!
//! Command-line entry point. Validates inspections, drives the webhook
//! queue, retries failed exports and serves the HTTP API.

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

mod cli;
#[cfg(feature = "server")]
mod server;

/// Main entry point for the vistoria CLI
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
