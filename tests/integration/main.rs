//! Integration tests for the vistoria CLI
//!
//! Each test runs the binary against its own temporary data directory.

#[allow(dead_code)]
#[path = "../unit/common/mod.rs"]
mod common;

mod cli_test;

use assert_cmd::cargo;
use std::path::Path;

use vistoria::adapters::file::{InspectionFile, JsonInspectionSource};
use vistoria::core::models::Schema;
use vistoria::paths;

/// Helper function to create a vistoria command bound to `data_dir`
fn vistoria(data_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(cargo::cargo_bin!("vistoria"));
    cmd.arg("--data-dir").arg(data_dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Store an inspection that passes validation under `cabin_type`
fn write_complete_inspection(data_dir: &Path, inspection_id: &str, cabin_type: &str) {
    let schema = Schema::builtin().unwrap();
    let (fields, media) = common::complete_rows(&schema, cabin_type);
    write_inspection(data_dir, inspection_id, &InspectionFile { fields, media });
}

fn write_inspection(data_dir: &Path, inspection_id: &str, file: &InspectionFile) {
    JsonInspectionSource::new(&paths::inspections_dir(data_dir))
        .write(inspection_id, file)
        .unwrap();
}
