//! Initialize a data directory

use std::fs;
use std::path::Path;

use vistoria::config::AppConfig;
use vistoria::output::{OperationResult, OutputMode};
use vistoria::paths;

const WEBHOOK_EXAMPLE: &str = r#"
# Webhook endpoints (uncomment to enable):
# [webhooks.work_order]
# url = "https://os.example.com/hooks/vistoria"
# api_key = "secret"
#
# [webhooks.notification]
# url = "https://alerts.example.com/hooks/vistoria"
#
# [webhooks.cost_tracking]
# url = "https://costs.example.com/hooks/vistoria"
# headers = { "X-Tenant" = "acme" }
"#;

/// Create the data directory layout and a default `vistoria.toml`
pub fn init(data_dir: &Path, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    let config_path = paths::config_file(data_dir);

    if config_path.exists() && !force {
        OperationResult {
            success: false,
            message: format!(
                "Already initialized ({} exists). Use --force to reinitialize.",
                config_path.display()
            ),
        }
        .render(mode);
        return Ok(());
    }

    for dir in [
        paths::inspections_dir(data_dir),
        paths::reports_dir(data_dir),
        paths::public_dir(data_dir),
        paths::outbox_dir(data_dir),
    ] {
        fs::create_dir_all(&dir)?;
    }

    AppConfig::default().save(data_dir)?;
    let mut content = fs::read_to_string(&config_path)?;
    content.push_str(WEBHOOK_EXAMPLE);
    fs::write(&config_path, content)?;

    OperationResult {
        success: true,
        message: format!("Initialized {}", data_dir.display()),
    }
    .render(mode);
    Ok(())
}
