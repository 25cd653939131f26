//! Validate an inspection for report generation

use std::path::Path;

use vistoria::output::{OutputMode, ValidationReport};
use vistoria::workspace::Workspace;

/// Print the report validation of one inspection
///
/// Fails when critical items block report generation.
pub fn validate(data_dir: &Path, inspection_id: &str, mode: OutputMode) -> anyhow::Result<()> {
    let ws = Workspace::open(data_dir)?;

    if !ws.inspections().exists(inspection_id)? {
        anyhow::bail!("Inspection {inspection_id} not found");
    }

    let validation = ws.report_validator().validate_final_report(inspection_id)?;
    let can_generate = validation.can_generate();

    ValidationReport {
        inspection_id: inspection_id.to_string(),
        validation,
    }
    .render(mode);

    if !can_generate {
        anyhow::bail!("Report for {inspection_id} is blocked by critical errors");
    }
    Ok(())
}
