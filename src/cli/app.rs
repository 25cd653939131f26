//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands;
use vistoria::output::OutputMode;
use vistoria::paths;

/// vistoria - Inspection report validation and webhook delivery
#[derive(Parser, Debug)]
#[command(
    name = "vistoria",
    version,
    about = "Inspection report validation and webhook delivery",
    long_about = "Validate field inspections before report generation and deliver\n\
                  inspection events to external systems.\n\n\
                  Events are queued with a priority and delivered with retries;\n\
                  items that keep failing end up in the dead-letter state."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory (default: $VISTORIA_DATA_DIR or ./.vistoria)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and a default configuration
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Check whether an inspection can produce its final report
    Validate {
        /// Inspection ID
        inspection_id: String,
    },

    /// Manage the webhook queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Webhook endpoint tools
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },

    /// Report export tools
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum QueueAction {
    /// Add an event to the queue
    Enqueue {
        /// Event type, e.g. `work_order_created`
        event_type: String,

        /// Event payload as JSON
        #[arg(default_value = "{}")]
        payload: String,

        /// Priority (higher is delivered first); derived from the event when omitted
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<i32>,
    },

    /// Deliver due items
    Process {
        /// Maximum items to deliver (default: `dispatcher.batch_size`)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show queue counts and recent delivery attempts
    Stats {
        /// Number of log entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum WebhookAction {
    /// Send a sample event straight to an endpoint
    Test {
        /// Target: `work_order`, `notification` or `cost_tracking`
        name: String,

        /// Payload to send instead of the built-in sample (JSON)
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExportAction {
    /// Retry a failed export
    Retry {
        /// Export record ID
        id: String,
    },
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let data_dir = paths::data_dir(cli.data_dir.as_deref());

    match cli.command {
        Some(Command::Init { force }) => commands::init(&data_dir, force, output_mode),
        Some(Command::Validate { inspection_id }) => {
            commands::validate(&data_dir, &inspection_id, output_mode)
        },
        Some(Command::Queue { action }) => commands::queue(&data_dir, action, output_mode),
        Some(Command::Webhook { action }) => commands::webhook(&data_dir, action, output_mode),
        Some(Command::Export { action }) => commands::export(&data_dir, action, output_mode),
        #[cfg(feature = "server")]
        Some(Command::Serve { port }) => commands::serve(&data_dir, port),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": vistoria::VERSION
                    })
                );
            } else {
                println!("vistoria v{}", vistoria::VERSION);
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": vistoria::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("vistoria v{}", vistoria::VERSION);
                println!("\nRun 'vistoria --help' for usage");
                println!("Run 'vistoria init' to get started");
            }
            Ok(())
        },
    }
}
