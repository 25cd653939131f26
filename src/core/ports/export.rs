//! Export ports
//!
//! Defines the interfaces for export records and the report pipeline stages.

use super::super::models::{ExportLog, ReportValidation};

/// Storage for export records
pub trait ExportLogStore: Send + Sync {
    /// Fetch an export record
    fn get(&self, id: &str) -> anyhow::Result<Option<ExportLog>>;

    /// Insert or replace an export record
    fn save(&self, log: &ExportLog) -> anyhow::Result<()>;

    /// All export records
    fn list(&self) -> anyhow::Result<Vec<ExportLog>>;
}

/// Report rendering, upload and email delivery
pub trait ReportExporter: Send + Sync {
    /// Render the report, returning the generated file path
    fn generate(&self, inspection_id: &str, validation: &ReportValidation)
    -> anyhow::Result<String>;

    /// Upload a generated file, returning its URL
    fn upload(&self, report_path: &str) -> anyhow::Result<String>;

    /// Email the report link
    fn send_email(
        &self,
        inspection_id: &str,
        file_url: &str,
        recipients: &[String],
    ) -> anyhow::Result<()>;
}
