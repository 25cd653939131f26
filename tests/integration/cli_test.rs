//! CLI workflows: init, validate, queue, webhook and export commands

use predicates::prelude::*;
use tempfile::TempDir;

use vistoria::adapters::file::InspectionFile;
use vistoria::core::models::FieldRow;
use vistoria::paths;

use super::{vistoria, write_complete_inspection, write_inspection};

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    vistoria(dir.path()).arg("init").assert().success();
    dir
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn version_prints_crate_version() {
    let dir = TempDir::new().unwrap();
    vistoria(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn init_writes_config_once() {
    let dir = initialized();
    let config = std::fs::read_to_string(paths::config_file(dir.path())).unwrap();
    assert!(config.contains("[dispatcher]"));
    assert!(config.contains("# [webhooks.work_order]"));
    assert!(paths::inspections_dir(dir.path()).is_dir());

    vistoria(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    vistoria(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn validate_complete_inspection() {
    let dir = initialized();
    write_complete_inspection(dir.path(), "insp-1", "POSTE");

    vistoria(dir.path())
        .args(["validate", "insp-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    let output = vistoria(dir.path()).args(["--json", "validate", "insp-1"]).output().unwrap();
    let value = stdout_json(&output);
    assert_eq!(value["isValid"], true);
    assert_eq!(value["inspection_id"], "insp-1");
}

#[test]
fn validate_blocked_inspection_fails() {
    let dir = initialized();
    let file = InspectionFile {
        fields: vec![FieldRow::new("client", "nome_cliente", "ACME")],
        media: vec![],
    };
    write_inspection(dir.path(), "insp-2", &file);

    let output = vistoria(dir.path()).args(["--json", "validate", "insp-2"]).output().unwrap();
    assert!(!output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["criticalErrors"].as_array().unwrap().len(), 2);
    assert!(
        value["errorsSample"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("O módulo \"Transformadores\" é obrigatório e não foi preenchido."))
    );
}

#[test]
fn validate_unknown_inspection_fails() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["validate", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn enqueue_then_stats() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["queue", "enqueue", "work_order_created", r#"{"priority":"high"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("priority 5"));

    let output = vistoria(dir.path()).args(["--json", "queue", "stats"]).output().unwrap();
    let value = stdout_json(&output);
    assert_eq!(value["stats"]["pending"], 1);
    assert_eq!(value["stats"]["total"], 1);
}

#[test]
fn enqueue_rejects_invalid_json() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["queue", "enqueue", "work_order_created", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn process_dead_letters_unconfigured_events() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["queue", "enqueue", "corrective_action_cost_changed", "{}"])
        .assert()
        .success();

    let output = vistoria(dir.path()).args(["--json", "queue", "process"]).output().unwrap();
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["processed"], 1);
    assert_eq!(value["results"][0]["status"], "dead");

    let output = vistoria(dir.path()).args(["--json", "queue", "stats"]).output().unwrap();
    let value = stdout_json(&output);
    assert_eq!(value["stats"]["dead"], 1);
    assert_eq!(value["recent"][0]["target"], "cost_tracking");
}

#[test]
fn webhook_test_unconfigured_reports_failure() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["webhook", "test", "notification"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn webhook_test_unknown_name_fails() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["webhook", "test", "billing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown webhook"));
}

#[test]
fn export_retry_unknown_fails() {
    let dir = initialized();
    vistoria(dir.path())
        .args(["export", "retry", "exp-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn data_dir_from_environment() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("from-env");
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("vistoria"))
        .arg("init")
        .env("VISTORIA_DATA_DIR", &data_dir)
        .env("NO_COLOR", "1")
        .assert()
        .success();
    assert!(paths::config_file(&data_dir).is_file());
}
