//! Webhook endpoint commands

use std::path::Path;

use anyhow::Context;

use crate::cli::app::WebhookAction;
use vistoria::api::{self, TestWebhookRequest};
use vistoria::output::{OutputMode, render_test_delivery};
use vistoria::workspace::Workspace;

/// Handle webhook subcommands
pub fn webhook(data_dir: &Path, action: WebhookAction, mode: OutputMode) -> anyhow::Result<()> {
    match action {
        WebhookAction::Test { name, data } => {
            let ws = Workspace::open(data_dir)?;
            let test_data: Option<serde_json::Value> = data
                .map(|d| serde_json::from_str(&d))
                .transpose()
                .context("--data is not valid JSON")?;

            let outcome = api::test_webhook(
                &ws,
                TestWebhookRequest {
                    webhook_name: name,
                    test_data,
                },
            )?;
            render_test_delivery(&outcome, mode);
            Ok(())
        },
    }
}
