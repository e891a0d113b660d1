//! Configuration infrastructure
//!
//! Contains configuration loading and management for basket mapping and
//! card harvesting.
//!
//! Configuration is organized into sections:
//! 1. Probe settings (basket host template, politeness, retries)
//! 2. Mapping and harvest settings
//! 3. File locations and logging
//!
//! Every section is `#[serde(default)]`, so configuration files written by
//! older versions keep loading and pick up defaults for new fields.

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::constants::{basket, harvest, probing};
use crate::domain::{BasketLabel, DomainError};
use crate::infrastructure::retry_policy::RetryPolicy;

/// Default values shared by the configuration sections
mod defaults {
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "basket-scout.log";

    pub const CATALOG_CSV: &str = "res.csv";
    pub const BASKET_MAP: &str = "basket_map.json";
    pub const RECORDS: &str = "res.json";
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub probe: ProbeConfig,
    pub mapping: MappingConfig,
    pub harvest: HarvestConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Existence probe settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Basket host template; `{basket}` becomes the two-digit label
    pub host_pattern: String,

    /// Asset path probed below `vol/part/article`
    pub probe_asset: String,

    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Fixed pause before every probe in milliseconds
    pub delay_ms: u64,

    /// Token-bucket pacing; takes precedence over `delay_ms` when non-zero
    pub max_requests_per_second: u32,

    /// Transport retries for transient outcomes (timeouts, 429, 5xx)
    pub retry: RetryPolicy,
}

/// Basket range mapper settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Highest basket label tried during discovery
    pub max_basket: u8,
}

/// Card harvester settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Card document path below `vol/part/article`
    pub card_asset: String,

    /// Card downloads in flight
    pub concurrency: usize,

    /// Wait after HTTP 429 in milliseconds
    pub rate_limit_backoff_ms: u64,

    /// HTTP 429 answers tolerated per card
    pub max_rate_limit_retries: u32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries after a timeout or connection failure
    pub retry: RetryPolicy,
}

/// Input and output files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// CSV whose first column holds product identifiers
    pub catalog_csv: PathBuf,

    /// Flat JSON volume → basket document
    pub basket_map: PathBuf,

    /// JSON-lines file of harvested cards
    pub records: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host_pattern: basket::HOST_PATTERN.to_string(),
            probe_asset: basket::PROBE_ASSET.to_string(),
            user_agent: probing::DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: probing::DEFAULT_PROBE_TIMEOUT_SECONDS,
            delay_ms: probing::DEFAULT_PROBE_DELAY_MS,
            max_requests_per_second: 0,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            max_basket: basket::MAX_LABEL,
        }
    }
}

impl MappingConfig {
    /// Highest label as a validated basket label
    pub fn last_label(&self) -> Result<BasketLabel, DomainError> {
        BasketLabel::new(self.max_basket)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            card_asset: basket::CARD_ASSET.to_string(),
            concurrency: harvest::DEFAULT_CONCURRENCY,
            rate_limit_backoff_ms: harvest::DEFAULT_RATE_LIMIT_BACKOFF_MS,
            max_rate_limit_retries: harvest::DEFAULT_MAX_RATE_LIMIT_RETRIES,
            timeout_seconds: harvest::DEFAULT_TIMEOUT_SECONDS,
            retry: RetryPolicy::fixed(
                harvest::DEFAULT_TRANSPORT_RETRIES,
                harvest::DEFAULT_TRANSPORT_RETRY_DELAY_MS,
            ),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog_csv: PathBuf::from(defaults::CATALOG_CSV),
            basket_map: PathBuf::from(defaults::BASKET_MAP),
            records: PathBuf::from(defaults::RECORDS),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("hyper_util".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters
            },
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing file
    Loaded,
    /// No file existed; defaults were written
    CreatedDefault,
    /// The file did not parse and was replaced with defaults
    ResetCorrupted {
        reason: String,
        /// Backup location, or why the backup failed
        backup: Result<PathBuf, String>,
    },
}

impl ConfigOrigin {
    pub fn log(&self, config_path: &Path) {
        match self {
            Self::Loaded => info!("Loaded configuration from: {:?}", config_path),
            Self::CreatedDefault => {
                info!("Configuration file not found, created default: {:?}", config_path);
            }
            Self::ResetCorrupted { reason, backup } => {
                warn!("⚠️  Configuration file is invalid: {}", reason);
                match backup {
                    Ok(path) => info!("Backed up corrupted config to: {:?}", path),
                    Err(e) => warn!("Failed to create backup of corrupted config: {}", e),
                }
                warn!("⚠️  Reset to default configuration: {:?}", config_path);
            }
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("basket-scout");

        Ok(config_dir)
    }

    /// Create a configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join("basket_scout_config.json");

        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { config_path: path.into() }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        let (config, origin) = self.load_config_with_origin().await?;
        origin.log(&self.config_path);
        Ok(config)
    }

    /// Load configuration without logging; the caller reports the origin
    /// once its subscriber is installed
    pub async fn load_config_with_origin(&self) -> Result<(AppConfig, ConfigOrigin)> {
        if !self.config_path.exists() {
            let default_config = AppConfig::default();
            self.save_config_quiet(&default_config).await?;
            return Ok((default_config, ConfigOrigin::CreatedDefault));
        }

        let content = fs::read_to_string(&self.config_path).await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok((config, ConfigOrigin::Loaded)),
            Err(parse_error) => {
                // Keep the broken file around for inspection
                let backup_path = self.config_path.with_extension("json.corrupted");
                let backup = fs::copy(&self.config_path, &backup_path)
                    .await
                    .map(|_| backup_path)
                    .map_err(|e| e.to_string());

                let default_config = AppConfig::default();
                self.save_config_quiet(&default_config).await
                    .context("Failed to save default configuration")?;

                Ok((
                    default_config,
                    ConfigOrigin::ResetCorrupted {
                        reason: parse_error.to_string(),
                        backup,
                    },
                ))
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.save_config_quiet(config).await?;
        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    async fn save_config_quiet(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content).await
            .context("Failed to write configuration file")
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
