//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Every field has a built-in
//! default, so a missing file is never fatal: it logs a warning and the
//! defaults apply.
//!
//! # Resolution Priority
//!
//! Config file path:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`EOA_CONFIG`)
//! 3. Platform config directory (`~/.config/eoa/config.toml` on Linux)
//!
//! Data folder:
//! 1. Command-line argument (`--data-folder`)
//! 2. Environment variable (`EOA_DATA_FOLDER`)
//! 3. TOML `data_folder`
//! 4. Platform data directory (`~/.local/share/eoa` on Linux)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "EOA_CONFIG";

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV_VAR: &str = "EOA_DATA_FOLDER";

const APP_DIR_NAME: &str = "eoa";
const DATABASE_FILE_NAME: &str = "eoa.db";
const STATE_FILE_NAME: &str = "fetch_state.json";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding the database and fetch state (optional)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Read API listen address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Federal Register source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Ingestion run settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_folder: None,
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            source: SourceConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Federal Register API client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Stable client identifier sent as User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry budget for 5xx and network failures (429 does not consume it)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound of the random jitter added to each backoff
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,

    /// Wait applied to a 429 response without a usable Retry-After header
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            max_jitter_ms: default_max_jitter_ms(),
            default_retry_after_secs: default_retry_after_secs(),
        }
    }
}

/// Ingestion run settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Page size for scheduled and backfill runs
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page size for manual fetch runs
    #[serde(default = "default_manual_page_size")]
    pub manual_page_size: u32,

    /// Pause between pages of a manual fetch
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause after a page-level failure
    #[serde(default = "default_page_failure_delay_ms")]
    pub page_failure_delay_ms: u64,

    /// Run-level retries after a page-level failure (scheduled runs)
    #[serde(default = "default_run_max_retries")]
    pub run_max_retries: u32,

    /// Delay between run-level retries
    #[serde(default = "default_run_retry_delay_secs")]
    pub run_retry_delay_secs: u64,

    /// Interval of the recurring incremental update
    #[serde(default = "default_update_interval_hours")]
    pub update_interval_hours: u64,

    /// Look-back window of the recurring incremental update
    #[serde(default = "default_update_days_back")]
    pub update_days_back: u32,

    /// First year of a historical backfill
    #[serde(default = "default_backfill_start_year")]
    pub backfill_start_year: i32,

    /// Maximum time a page commit keeps retrying on SQLite lock contention
    #[serde(default = "default_max_lock_wait_ms")]
    pub max_lock_wait_ms: u64,

    /// Manual fetch checkpoint file (defaults to `<data_folder>/fetch_state.json`)
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            manual_page_size: default_manual_page_size(),
            page_delay_ms: default_page_delay_ms(),
            page_failure_delay_ms: default_page_failure_delay_ms(),
            run_max_retries: default_run_max_retries(),
            run_retry_delay_secs: default_run_retry_delay_secs(),
            update_interval_hours: default_update_interval_hours(),
            update_days_back: default_update_days_back(),
            backfill_start_year: default_backfill_start_year(),
            max_lock_wait_ms: default_max_lock_wait_ms(),
            state_file: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://www.federalregister.gov/api/v1/".to_string()
}

fn default_user_agent() -> String {
    "ExecutiveOrdersArchive/1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_max_jitter_ms() -> u64 {
    1000
}

fn default_retry_after_secs() -> u64 {
    60
}

fn default_page_size() -> u32 {
    50
}

fn default_manual_page_size() -> u32 {
    20
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_page_failure_delay_ms() -> u64 {
    5000
}

fn default_run_max_retries() -> u32 {
    3
}

fn default_run_retry_delay_secs() -> u64 {
    300
}

fn default_update_interval_hours() -> u64 {
    24
}

fn default_update_days_back() -> u32 {
    30
}

fn default_backfill_start_year() -> i32 {
    1994
}

fn default_max_lock_wait_ms() -> u64 {
    5000
}

/// Resolve the config file path (CLI → ENV → platform default)
///
/// Returns `None` only when no platform config directory exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Load bootstrap configuration
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but does not parse is a `Config` error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the data folder (CLI → ENV → TOML → platform default)
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./eoa_data"))
}

/// Resolved data folder with derived file locations
#[derive(Debug, Clone)]
pub struct DataFolder {
    root: PathBuf,
}

impl DataFolder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the folder if missing
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("Created data folder {}", self.root.display());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    /// Checkpoint file for manual fetch runs, honouring `ingest.state_file`
    pub fn state_file_path(&self, config: &IngestConfig) -> PathBuf {
        config
            .state_file
            .clone()
            .unwrap_or_else(|| self.root.join(STATE_FILE_NAME))
    }
}
