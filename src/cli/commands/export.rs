//! Report export commands

use std::path::Path;

use crate::cli::app::ExportAction;
use vistoria::api::{self, RetryExportRequest};
use vistoria::output::{OutputMode, render_export_retry};
use vistoria::workspace::Workspace;

/// Handle export subcommands
pub fn export(data_dir: &Path, action: ExportAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        ExportAction::Retry { id } => {
            let ws = Workspace::open(data_dir)?;
            let outcome = api::retry_export(&ws, RetryExportRequest { export_log_id: id })?;
            render_export_retry(&outcome, mode);
            if !outcome.success {
                anyhow::bail!("Export {} failed again", outcome.export_id);
            }
            Ok(())
        },
    }
}
