//! Configuration management
//!
//! Settings live in `<data-dir>/vistoria.toml`. Every section is optional;
//! missing values fall back to defaults.
//!
//! ```toml
//! [dispatcher]
//! timeout_secs = 30
//! max_attempts = 3
//! backoff_minutes = 5
//! batch_size = 10
//!
//! [webhooks.work_order]
//! url = "https://os.example.com/hooks"
//! api_key = "..."
//!
//! [validation]
//! required_modules = ["client", "transformers", "cabin_type", "bt", "general_state"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::models::{RetryPolicy, Schema, WebhookEndpoints};
use crate::core::services::{DispatchPolicy, ValidationPolicy};
use crate::paths;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Delivery settings
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Endpoint per webhook target
    #[serde(default)]
    pub webhooks: WebhookEndpoints,
    /// Report validation policy
    #[serde(default)]
    pub validation: ValidationPolicy,
    /// Custom module schema
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts before dead-lettering
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit in minutes
    #[serde(default = "default_backoff_minutes")]
    pub backoff_minutes: i64,
    /// Items claimed per run
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

const fn default_backoff_minutes() -> i64 {
    RetryPolicy::DEFAULT_BACKOFF_MINUTES
}

const fn default_batch_size() -> usize {
    10
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_minutes: default_backoff_minutes(),
            batch_size: default_batch_size(),
        }
    }
}

impl DispatcherConfig {
    /// Policy handed to the dispatcher
    #[must_use]
    pub fn policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            timeout: std::time::Duration::from_secs(self.timeout_secs.max(1)),
            retry: RetryPolicy {
                max_attempts: self.max_attempts.max(1),
                backoff: chrono::Duration::minutes(self.backoff_minutes.max(0)),
            },
        }
    }
}

/// Schema override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// TOML schema file, relative to the data directory; built-in when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load config from `<data_dir>/vistoria.toml`, or defaults if absent
    ///
    /// A file that exists but does not parse is an error.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = paths::config_file(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
    }

    /// Save config to `<data_dir>/vistoria.toml`
    pub fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(data_dir)?;
        let content = toml::to_string_pretty(self)?;
        fs::write(paths::config_file(data_dir), content)?;
        Ok(())
    }

    /// Load the configured schema and check the validation policy against it
    pub fn schema(&self, data_dir: &Path) -> anyhow::Result<Schema> {
        let schema = match &self.schema.path {
            Some(path) if path.is_absolute() => Schema::load(path)?,
            Some(path) => Schema::load(&data_dir.join(path))?,
            None => Schema::builtin()?,
        };
        self.validation.check_against(&schema)?;
        Ok(schema)
    }
}
