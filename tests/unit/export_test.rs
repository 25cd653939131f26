//! Export retry through the API and the file adapters

use vistoria::adapters::{InMemoryExportLogStore, InMemoryInspectionSource, JsonExportLogStore};
use vistoria::api::{self, RetryExportRequest};
use vistoria::config::AppConfig;
use vistoria::core::models::{
    ExportLog, ExportStage, ExportStatus, MAX_EXPORT_RETRIES, ReportValidation, RetryMode,
};
use vistoria::core::ports::{ExportLogStore, ReportExporter};
use vistoria::paths;
use vistoria::workspace::Workspace;

use crate::common::complete_source;

/// Exporter whose email stage always fails
struct BrokenMail;

impl ReportExporter for BrokenMail {
    fn generate(&self, inspection_id: &str, _: &ReportValidation) -> anyhow::Result<String> {
        Ok(format!("memory://reports/{inspection_id}"))
    }

    fn upload(&self, report_path: &str) -> anyhow::Result<String> {
        Ok(report_path.replace("reports", "public"))
    }

    fn send_email(&self, _: &str, _: &str, _: &[String]) -> anyhow::Result<()> {
        anyhow::bail!("SMTP unavailable")
    }
}

fn failed(id: &str, inspection_id: &str, stage: ExportStage) -> ExportLog {
    let mut log = ExportLog::new(id, inspection_id, vec!["eng@example.com".to_string()]);
    log.record_failure(stage, "previous failure");
    log
}

fn workspace(logs: &[ExportLog], source: InMemoryInspectionSource) -> Workspace {
    let store = InMemoryExportLogStore::new();
    for log in logs {
        store.save(log).unwrap();
    }
    Workspace::in_memory(AppConfig::default())
        .unwrap()
        .with_exports(Box::new(store))
        .with_inspections(Box::new(source))
}

fn retry(ws: &Workspace, id: &str) -> Result<vistoria::core::services::ExportRetryOutcome, api::ApiError> {
    api::retry_export(
        ws,
        RetryExportRequest {
            export_log_id: id.to_string(),
        },
    )
}

#[test]
fn email_failure_resends_email_only() {
    let mut log = failed("e1", "insp-1", ExportStage::Email);
    log.file_url = Some("memory://public/old".to_string());
    let ws = workspace(&[log], InMemoryInspectionSource::new());

    let outcome = retry(&ws, "e1").unwrap();
    assert_eq!(outcome.mode, RetryMode::EmailOnly);
    assert!(outcome.success);
    assert_eq!(outcome.retry_count, 1);
    assert_eq!(outcome.file_url.as_deref(), Some("memory://public/old"));

    let stored = ws.exports().get("e1").unwrap().unwrap();
    assert_eq!(stored.status, ExportStatus::Success);
    assert_eq!(stored.error, None);
}

#[test]
fn upload_failure_reuploads() {
    let mut log = failed("e2", "insp-1", ExportStage::Upload);
    log.report_path = Some("memory://reports/insp-1-1".to_string());
    let ws = workspace(&[log], InMemoryInspectionSource::new());

    let outcome = retry(&ws, "e2").unwrap();
    assert_eq!(outcome.mode, RetryMode::UploadOnly);
    assert_eq!(outcome.file_url.as_deref(), Some("memory://public/insp-1-1"));
}

#[test]
fn generation_failure_regenerates_complete_inspection() {
    let log = failed("e3", "insp-1", ExportStage::Generation);
    let ws = workspace(&[log], complete_source("insp-1", "CONVENCIONAL"));

    let outcome = retry(&ws, "e3").unwrap();
    assert_eq!(outcome.mode, RetryMode::FullRegeneration);
    assert!(outcome.success);
    assert!(outcome.file_url.unwrap().starts_with("memory://public/insp-1"));
}

#[test]
fn critical_errors_block_regeneration() {
    let log = failed("e4", "insp-9", ExportStage::Generation);
    let ws = workspace(&[log.clone()], InMemoryInspectionSource::new());

    let err = retry(&ws, "e4").unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.message.contains("Autorização do Cliente"));

    // Refusals leave the record untouched.
    assert_eq!(ws.exports().get("e4").unwrap().unwrap(), log);
}

#[test]
fn succeeded_export_is_rejected() {
    let mut log = failed("e5", "insp-1", ExportStage::Email);
    log.record_success();
    let ws = workspace(&[log], InMemoryInspectionSource::new());
    assert_eq!(retry(&ws, "e5").unwrap_err().status_code(), 400);
}

#[test]
fn retry_limit_is_enforced() {
    let mut log = failed("e6", "insp-1", ExportStage::Email);
    log.file_url = Some("memory://public/x".to_string());
    log.retry_count = MAX_EXPORT_RETRIES;
    let ws = workspace(&[log], InMemoryInspectionSource::new());

    let err = retry(&ws, "e6").unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.message.contains("retry limit"));
}

#[test]
fn unknown_export_is_not_found() {
    let ws = workspace(&[], InMemoryInspectionSource::new());
    assert_eq!(retry(&ws, "missing").unwrap_err().status_code(), 404);
}

#[test]
fn failed_stage_is_recorded_again() {
    let mut log = failed("e7", "insp-1", ExportStage::Email);
    log.file_url = Some("memory://public/r".to_string());
    let ws = workspace(&[log], InMemoryInspectionSource::new()).with_exporter(Box::new(BrokenMail));

    let outcome = retry(&ws, "e7").unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.failed_stage, Some(ExportStage::Email));
    assert_eq!(outcome.error.as_deref(), Some("SMTP unavailable"));

    let stored = ws.exports().get("e7").unwrap().unwrap();
    assert_eq!(stored.status, ExportStatus::Failed);
    assert_eq!(stored.retry_count, 1);
}

#[test]
fn file_backed_regeneration_writes_report_and_outbox() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    JsonExportLogStore::new(&paths::exports_file(data_dir))
        .save(&failed("e8", "insp-1", ExportStage::Generation))
        .unwrap();

    let ws = Workspace::open(data_dir)
        .unwrap()
        .with_inspections(Box::new(complete_source("insp-1", "POSTE")));
    let outcome = retry(&ws, "e8").unwrap();

    assert!(outcome.success, "{:?}", outcome.error);
    assert!(outcome.file_url.unwrap().starts_with("file://"));
    assert_eq!(std::fs::read_dir(paths::reports_dir(data_dir)).unwrap().count(), 1);
    assert_eq!(std::fs::read_dir(paths::public_dir(data_dir)).unwrap().count(), 1);
    assert_eq!(std::fs::read_dir(paths::outbox_dir(data_dir)).unwrap().count(), 1);

    let reopened = JsonExportLogStore::new(&paths::exports_file(data_dir));
    assert_eq!(reopened.get("e8").unwrap().unwrap().status, ExportStatus::Success);
}
