//! Export retry
//!
//! Re-drives a failed report export from the stage where it broke.

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use super::report_validator::ReportValidator;
use crate::core::models::{
    ExportLog, ExportStage, ExportStatus, MAX_EXPORT_RETRIES, ReportValidation, RetryMode,
};
use crate::core::ports::{ExportLogStore, ReportExporter};

/// Why a retry was refused
#[derive(Debug, Error)]
pub enum ExportRetryError {
    /// No such export record
    #[error("export {0} not found")]
    NotFound(String),

    /// The export already went through
    #[error("export {0} already exported successfully")]
    AlreadySucceeded(String),

    /// Retry budget exhausted
    #[error("export {id} reached the retry limit ({MAX_EXPORT_RETRIES})")]
    RetryLimit {
        /// Export ID
        id: String,
    },

    /// The inspection has critical gaps, so a new report cannot be generated
    #[error("inspection {inspection_id} has critical errors: {}", errors.join("; "))]
    Blocked {
        /// Inspection ID
        inspection_id: String,
        /// Critical error sentences
        errors: Vec<String>,
    },

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Result of one retry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRetryOutcome {
    /// Export ID
    pub export_id: String,
    /// What was re-run
    pub mode: RetryMode,
    /// Whether every re-run stage succeeded
    pub success: bool,
    /// Status after the run
    pub status: ExportStatus,
    /// Retries so far, including this one
    pub retry_count: u32,
    /// Stage that failed in this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<ExportStage>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Report URL, once uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Decide how much of an export to re-run
#[must_use]
pub fn plan_retry(log: &ExportLog) -> RetryMode {
    match (log.failed_stage, &log.file_url, &log.report_path) {
        (Some(ExportStage::Email), Some(_), _) => RetryMode::EmailOnly,
        (Some(ExportStage::Upload), _, Some(_)) => RetryMode::UploadOnly,
        _ => RetryMode::FullRegeneration,
    }
}

/// Check whether an export may be retried at all
pub fn ensure_retryable(log: &ExportLog) -> Result<(), ExportRetryError> {
    if log.status == ExportStatus::Success {
        return Err(ExportRetryError::AlreadySucceeded(log.id.clone()));
    }
    if log.retry_count >= MAX_EXPORT_RETRIES {
        return Err(ExportRetryError::RetryLimit { id: log.id.clone() });
    }
    Ok(())
}

/// Runs export retries
pub struct ExportRetrier<'a> {
    logs: &'a dyn ExportLogStore,
    exporter: &'a dyn ReportExporter,
    validator: &'a ReportValidator<'a>,
}

impl std::fmt::Debug for ExportRetrier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRetrier").finish_non_exhaustive()
    }
}

impl<'a> ExportRetrier<'a> {
    /// Create a retrier
    #[must_use]
    pub fn new(
        logs: &'a dyn ExportLogStore,
        exporter: &'a dyn ReportExporter,
        validator: &'a ReportValidator<'a>,
    ) -> Self {
        Self {
            logs,
            exporter,
            validator,
        }
    }

    /// Retry an export
    ///
    /// Stage failures are recorded on the export and reported in the
    /// outcome. Refusals (not found, already done, limit reached, critical
    /// validation errors) leave the record untouched.
    pub fn retry(&self, export_id: &str) -> Result<ExportRetryOutcome, ExportRetryError> {
        let mut log = self
            .logs
            .get(export_id)?
            .ok_or_else(|| ExportRetryError::NotFound(export_id.to_string()))?;
        ensure_retryable(&log)?;

        let mode = plan_retry(&log);
        if mode == RetryMode::FullRegeneration {
            let validation = self.validator.validate_final_report(&log.inspection_id)?;
            if !validation.can_generate() {
                return Err(ExportRetryError::Blocked {
                    inspection_id: log.inspection_id.clone(),
                    errors: validation.critical_errors,
                });
            }
            log.retry_count += 1;
            if self.run_generation(&mut log, &validation) {
                self.run_delivery(&mut log, mode);
            }
        } else {
            log.retry_count += 1;
            self.run_delivery(&mut log, mode);
        }
        self.logs.save(&log)?;

        let success = log.status == ExportStatus::Success;
        if success {
            info!("Export {} retried ({mode}): success", log.id);
        } else {
            warn!(
                "Export {} retry ({mode}) failed at {}: {}",
                log.id,
                log.failed_stage.map_or_else(|| "?".to_string(), |s| s.to_string()),
                log.error.as_deref().unwrap_or_default()
            );
        }

        Ok(ExportRetryOutcome {
            export_id: log.id.clone(),
            mode,
            success,
            status: log.status,
            retry_count: log.retry_count,
            failed_stage: if success { None } else { log.failed_stage },
            error: log.error.clone(),
            file_url: log.file_url.clone(),
        })
    }

    fn run_generation(&self, log: &mut ExportLog, validation: &ReportValidation) -> bool {
        match self.exporter.generate(&log.inspection_id, validation) {
            Ok(path) => {
                log.report_path = Some(path);
                log.file_url = None;
                true
            }
            Err(e) => {
                log.record_failure(ExportStage::Generation, &e.to_string());
                false
            }
        }
    }

    fn run_delivery(&self, log: &mut ExportLog, mode: RetryMode) {
        if mode != RetryMode::EmailOnly {
            let Some(path) = log.report_path.clone() else {
                log.record_failure(ExportStage::Upload, "no generated report to upload");
                return;
            };
            match self.exporter.upload(&path) {
                Ok(url) => log.file_url = Some(url),
                Err(e) => {
                    log.record_failure(ExportStage::Upload, &e.to_string());
                    return;
                }
            }
        }

        let Some(url) = log.file_url.clone() else {
            log.record_failure(ExportStage::Email, "no report URL to send");
            return;
        };
        match self.exporter.send_email(&log.inspection_id, &url, &log.recipients) {
            Ok(()) => log.record_success(),
            Err(e) => log.record_failure(ExportStage::Email, &e.to_string()),
        }
    }
}
