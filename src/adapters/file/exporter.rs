//! Local report exporter
//!
//! Stands in for the PDF renderer, object storage and mail service: the
//! report is a JSON summary, "uploading" copies it into a public directory,
//! and emails are written to an outbox directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use serde_json::json;

use super::lock::write_json_atomic;
use crate::core::models::ReportValidation;
use crate::core::ports::ReportExporter;

/// Exporter writing to local directories
#[derive(Debug, Clone)]
pub struct LocalExporter {
    reports_dir: PathBuf,
    public_dir: PathBuf,
    outbox_dir: PathBuf,
}

impl LocalExporter {
    /// Exporter rooted at the given directories
    #[must_use]
    pub fn new(reports_dir: &Path, public_dir: &Path, outbox_dir: &Path) -> Self {
        Self {
            reports_dir: reports_dir.to_path_buf(),
            public_dir: public_dir.to_path_buf(),
            outbox_dir: outbox_dir.to_path_buf(),
        }
    }
}

fn stamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.3f").to_string()
}

impl ReportExporter for LocalExporter {
    fn generate(
        &self,
        inspection_id: &str,
        validation: &ReportValidation,
    ) -> anyhow::Result<String> {
        let path = self.reports_dir.join(format!("{inspection_id}-{}.json", stamp()));
        let report = json!({
            "inspection_id": inspection_id,
            "generated_at": Utc::now(),
            "validation": validation,
        });
        write_json_atomic(&path, &report)?;
        info!("Generated report {}", path.display());
        Ok(path.to_string_lossy().to_string())
    }

    fn upload(&self, report_path: &str) -> anyhow::Result<String> {
        let source = Path::new(report_path);
        if !source.is_file() {
            anyhow::bail!("Report file not found: {report_path}");
        }
        let Some(name) = source.file_name() else {
            anyhow::bail!("Invalid report path: {report_path}");
        };
        fs::create_dir_all(&self.public_dir)?;
        let target = self.public_dir.join(name);
        fs::copy(source, &target)?;
        let absolute = fs::canonicalize(&target).unwrap_or(target);
        Ok(format!("file://{}", absolute.display()))
    }

    fn send_email(
        &self,
        inspection_id: &str,
        file_url: &str,
        recipients: &[String],
    ) -> anyhow::Result<()> {
        if recipients.is_empty() {
            anyhow::bail!("No recipients for inspection {inspection_id}");
        }
        let path = self.outbox_dir.join(format!("{}-{inspection_id}.json", stamp()));
        let mail = json!({
            "to": recipients,
            "subject": format!("Relatório da vistoria {inspection_id}"),
            "body": format!("O relatório da vistoria está disponível em {file_url}"),
            "created_at": Utc::now(),
        });
        write_json_atomic(&path, &mail)?;
        info!("Queued email for {} recipient(s)", recipients.len());
        Ok(())
    }
}
