//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use colored::Colorize;
use serde::Serialize;

use crate::core::models::{QueueStats, ReportValidation, WebhookLogEntry};
use crate::core::services::{DispatchOutcome, ExportRetryOutcome};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Result of validating an inspection for report generation
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Inspection ID
    pub inspection_id: String,
    /// Validation result
    #[serde(flatten)]
    pub validation: ReportValidation,
}

impl ValidationReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let v = &self.validation;
        println!("Inspection {}\n", self.inspection_id.bold());

        if v.is_valid {
            println!("{} All required modules, fields and photos are filled.", "OK".green().bold());
            return;
        }

        if !v.critical_errors.is_empty() {
            println!("{}", "Critical:".red().bold());
            for e in &v.critical_errors {
                println!("  {e}");
            }
            println!();
        }

        if !v.errors_sample.is_empty() {
            println!("{}", "Missing:".yellow().bold());
            for e in &v.errors_sample {
                println!("  {e}");
            }
            println!();
        }

        if v.can_generate() {
            println!(
                "{} {} item(s) missing; the report can still be generated.",
                "WARN".yellow().bold(),
                v.missing_fields.len()
            );
        } else {
            println!(
                "{} The report cannot be generated until critical items are filled.",
                "BLOCKED".red().bold()
            );
        }
    }
}

/// Result of one dispatcher run
#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    /// Items processed
    pub processed: usize,
    /// Items delivered
    pub delivered: usize,
    /// Items that failed
    pub failed: usize,
    /// Per-item outcomes
    pub results: Vec<DispatchOutcome>,
}

impl DispatchSummary {
    /// Summarize outcomes
    #[must_use]
    pub fn new(results: Vec<DispatchOutcome>) -> Self {
        let delivered = results.iter().filter(|r| r.success).count();
        Self {
            processed: results.len(),
            delivered,
            failed: results.len() - delivered,
            results,
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        if self.results.is_empty() {
            println!("No webhooks due.");
            return;
        }
        for r in &self.results {
            let id = r.item_id.map_or_else(|| "-".to_string(), |id| format!("#{id}"));
            let status = r.status.map_or_else(|| "?".to_string(), |s| s.to_string());
            if r.success {
                println!("  {} {id} {} -> {}", "OK".green(), r.event_type, r.target);
            } else {
                println!(
                    "  {} {id} {} -> {} [{status}] {}",
                    "FAIL".red(),
                    r.event_type,
                    r.target,
                    r.error.as_deref().unwrap_or_default().dimmed()
                );
            }
        }
        println!(
            "\nProcessed {}: {} delivered, {} failed",
            self.processed, self.delivered, self.failed
        );
    }
}

/// Queue counts and recent delivery attempts
#[derive(Debug, Serialize)]
pub struct QueueReport {
    /// Counts by status
    pub stats: QueueStats,
    /// Newest log entries first
    pub recent: Vec<WebhookLogEntry>,
}

impl QueueReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let s = &self.stats;
        println!("Webhook queue ({} item(s))\n", s.total);
        println!("  pending     {}", s.pending);
        println!("  processing  {}", s.processing);
        println!("  done        {}", s.done.to_string().green());
        println!("  failed      {}", s.failed.to_string().yellow());
        println!("  dead        {}", s.dead.to_string().red());

        if !self.recent.is_empty() {
            println!("\nRecent attempts:");
            for entry in &self.recent {
                let mark = if entry.success { "OK".green() } else { "FAIL".red() };
                let id = entry.item_id.map_or_else(|| "test".to_string(), |id| format!("#{id}"));
                println!(
                    "  {mark} {id} {} -> {} (attempt {}) {}",
                    entry.event_type,
                    entry.target,
                    entry.attempt,
                    entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
                );
            }
        }
    }
}

/// Render a test delivery
pub fn render_test_delivery(outcome: &DispatchOutcome, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(outcome),
        OutputMode::Human => {
            if outcome.success {
                println!(
                    "{} {} webhook answered HTTP {}",
                    "OK".green().bold(),
                    outcome.target,
                    outcome.response_status.unwrap_or_default()
                );
            } else {
                println!(
                    "{} {} webhook: {}",
                    "FAIL".red().bold(),
                    outcome.target,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

/// Render an export retry
pub fn render_export_retry(outcome: &ExportRetryOutcome, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(outcome),
        OutputMode::Human => {
            if outcome.success {
                println!(
                    "{} Export {} retried ({}), attempt {}",
                    "OK".green().bold(),
                    outcome.export_id,
                    outcome.mode,
                    outcome.retry_count
                );
                if let Some(url) = &outcome.file_url {
                    println!("  {url}");
                }
            } else {
                println!(
                    "{} Export {} ({}) failed at {}: {}",
                    "FAIL".red().bold(),
                    outcome.export_id,
                    outcome.mode,
                    outcome.failed_stage.map_or_else(|| "?".to_string(), |s| s.to_string()),
                    outcome.error.as_deref().unwrap_or_default()
                );
            }
        }
    }
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => println!("{}", self.message),
            OutputMode::Json => print_json(self),
        }
    }
}
