//! Centralized path definitions for vistoria
//!
//! All filesystem locations are derived from one data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! .vistoria/
//! ├── vistoria.toml          # Dispatcher, webhook and validation settings
//! ├── queue.json             # Webhook queue items and delivery logs
//! ├── exports.json           # Report export records
//! ├── inspections/           # One JSON file of field/media rows per inspection
//! │   └── <id>.json
//! ├── reports/               # Generated reports
//! ├── public/                # "Uploaded" reports
//! └── outbox/                # Emails waiting to be sent
//! ```

use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory
pub const DATA_DIR: &str = ".vistoria";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "VISTORIA_DATA_DIR";

const CONFIG_FILE: &str = "vistoria.toml";
const QUEUE_FILE: &str = "queue.json";
const EXPORTS_FILE: &str = "exports.json";
const INSPECTIONS_DIR: &str = "inspections";
const REPORTS_DIR: &str = "reports";
const PUBLIC_DIR: &str = "public";
const OUTBOX_DIR: &str = "outbox";

/// Resolve the data directory: explicit flag, then environment, then default
#[must_use]
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            std::env::var_os(DATA_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(DATA_DIR), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

/// Get path to `vistoria.toml`
#[must_use]
pub fn config_file(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Get path to the webhook queue file
#[must_use]
pub fn queue_file(data_dir: &Path) -> PathBuf {
    data_dir.join(QUEUE_FILE)
}

/// Get path to the export records file
#[must_use]
pub fn exports_file(data_dir: &Path) -> PathBuf {
    data_dir.join(EXPORTS_FILE)
}

/// Get path to the inspections directory
#[must_use]
pub fn inspections_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(INSPECTIONS_DIR)
}

/// Get path to the generated reports directory
#[must_use]
pub fn reports_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(REPORTS_DIR)
}

/// Get path to the uploaded reports directory
#[must_use]
pub fn public_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(PUBLIC_DIR)
}

/// Get path to the email outbox
#[must_use]
pub fn outbox_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(OUTBOX_DIR)
}
