//! Report export records
//!
//! An export runs three stages: generate the report file, upload it, email
//! the link. A failed export remembers which stage broke so a retry can
//! resume there instead of starting over.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum retries of one export
pub const MAX_EXPORT_RETRIES: u32 = 5;

/// Overall export status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    /// Not finished yet
    #[default]
    Pending,
    /// Report generated, uploaded and emailed
    Success,
    /// A stage failed
    Failed,
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Export stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    /// Rendering the report file
    Generation,
    /// Uploading the file to storage
    Upload,
    /// Emailing the download link
    Email,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Upload => write!(f, "upload"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// How much of an export a retry re-runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// Only resend the email with the existing link
    EmailOnly,
    /// Upload the existing file, then email
    UploadOnly,
    /// Validate, generate, upload and email
    FullRegeneration,
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailOnly => write!(f, "email_only"),
            Self::UploadOnly => write!(f, "upload_only"),
            Self::FullRegeneration => write!(f, "full_regeneration"),
        }
    }
}

/// Record of one report export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLog {
    /// Export ID
    pub id: String,
    /// Inspection the report belongs to
    pub inspection_id: String,
    /// Overall status
    #[serde(default)]
    pub status: ExportStatus,
    /// Stage that failed last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<ExportStage>,
    /// Retries so far
    #[serde(default)]
    pub retry_count: u32,
    /// Generated report file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    /// Uploaded report URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Email recipients
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Last error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last change
    pub updated_at: DateTime<Utc>,
}

impl ExportLog {
    /// A new pending export
    #[must_use]
    pub fn new(id: &str, inspection_id: &str, recipients: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            inspection_id: inspection_id.to_string(),
            status: ExportStatus::Pending,
            failed_stage: None,
            retry_count: 0,
            report_path: None,
            file_url: None,
            recipients,
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// Record a stage failure
    pub fn record_failure(&mut self, stage: ExportStage, error: &str) {
        self.status = ExportStatus::Failed;
        self.failed_stage = Some(stage);
        self.error = Some(error.to_string());
        self.updated_at = Utc::now();
    }

    /// Record a completed export
    pub fn record_success(&mut self) {
        self.status = ExportStatus::Success;
        self.failed_stage = None;
        self.error = None;
        self.updated_at = Utc::now();
    }
}
