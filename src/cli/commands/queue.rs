//! Webhook queue commands - enqueue, process, stats

use std::path::Path;

use anyhow::Context;

use crate::cli::app::QueueAction;
use vistoria::api::{self, EnqueueEventRequest};
use vistoria::output::{DispatchSummary, OperationResult, OutputMode, QueueReport};
use vistoria::workspace::Workspace;

/// Handle queue subcommands
pub fn queue(data_dir: &Path, action: QueueAction, mode: OutputMode) -> anyhow::Result<()> {
    let ws = Workspace::open(data_dir)?;

    match action {
        QueueAction::Enqueue {
            event_type,
            payload,
            priority,
        } => enqueue(&ws, event_type, &payload, priority, mode),
        QueueAction::Process { limit } => process(&ws, limit, mode),
        QueueAction::Stats { limit } => stats(&ws, limit, mode),
    }
}

fn enqueue(
    ws: &Workspace,
    event_type: String,
    payload: &str,
    priority: Option<i32>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let payload: serde_json::Value =
        serde_json::from_str(payload).context("Payload is not valid JSON")?;

    let data = api::enqueue_event(
        ws,
        EnqueueEventRequest {
            event_type,
            payload,
            priority,
        },
    )?;

    OperationResult {
        success: true,
        message: format!(
            "Enqueued #{} {} (priority {})",
            data.id, data.event_type, data.priority
        ),
    }
    .render(mode);
    Ok(())
}

fn process(ws: &Workspace, limit: Option<usize>, mode: OutputMode) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(ws.config().dispatcher.batch_size);
    let results = ws.dispatcher().process_batch(limit)?;
    DispatchSummary::new(results).render(mode);
    Ok(())
}

fn stats(ws: &Workspace, limit: usize, mode: OutputMode) -> anyhow::Result<()> {
    let queue = ws.queue();
    QueueReport {
        stats: queue.stats()?,
        recent: queue.recent_logs(limit)?,
    }
    .render(mode);
    Ok(())
}
