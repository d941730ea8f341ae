//! Configuration loading and API endpoint resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: resolution continues with
//! the remaining tiers and the problem is kept in [`AdminConfig::warnings`],
//! since resolution normally runs before logging is initialised.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the backend base URL
pub const ENV_API_URL: &str = "FONO_API_URL";

/// Environment variable pointing at an explicit TOML config file
pub const ENV_CONFIG_PATH: &str = "FONO_CONFIG";

/// Directory name used under the platform config dir
const APP_DIR: &str = "fono-admin";

/// Compiled-in fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub api_url: String,
    pub timeout_secs: u64,
    pub per_page: u32,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub download_dir: PathBuf,
}

impl CompiledDefaults {
    /// Defaults for the platform we are running on
    pub fn for_current_platform() -> Self {
        Self {
            api_url: "http://localhost:5001".to_string(),
            timeout_secs: 30,
            per_page: 20,
            log_level: "info".to_string(),
            log_file: None,
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// On-disk TOML configuration
///
/// All fields are optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Backend base URL, e.g. `https://fonogramas.example.org`
    #[serde(default)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Rows per listing page
    #[serde(default)]
    pub per_page: Option<u32>,

    /// Where downloaded ECAD files are written
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved configuration used by the admin client
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub per_page: u32,
    pub download_dir: PathBuf,
    pub logging: LoggingConfig,
    /// Problems met while resolving, for the caller to log once tracing is up
    pub warnings: Vec<String>,
}

/// Resolves [`AdminConfig`] from CLI, environment, TOML and defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_api_url: Option<String>,
    cli_config_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// API URL given on the command line
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        self.cli_api_url = url;
        self
    }

    /// Explicit config file given on the command line
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config_path = path;
        self
    }

    /// Resolve every setting. Fails only when the winning API URL is malformed.
    pub fn resolve(&self) -> Result<AdminConfig> {
        let defaults = CompiledDefaults::for_current_platform();
        let mut warnings = Vec::new();
        let toml_config = match self.load_toml() {
            Ok(config) => config.unwrap_or_default(),
            Err(warning) => {
                warn!("{}", warning);
                warnings.push(warning);
                TomlConfig::default()
            }
        };

        let api_url = if let Some(url) = &self.cli_api_url {
            url.clone()
        } else if let Ok(url) = std::env::var(ENV_API_URL) {
            url
        } else if let Some(url) = &toml_config.api_url {
            url.clone()
        } else {
            defaults.api_url.clone()
        };

        Ok(AdminConfig {
            api_url: normalize_base_url(&api_url)?,
            timeout: Duration::from_secs(toml_config.timeout_secs.unwrap_or(defaults.timeout_secs)),
            per_page: toml_config.per_page.unwrap_or(defaults.per_page).max(1),
            download_dir: toml_config.download_dir.clone().unwrap_or(defaults.download_dir),
            logging: toml_config.logging,
            warnings,
        })
    }

    /// `Ok(None)` when no file applies, `Err` with a warning when one is unusable
    fn load_toml(&self) -> std::result::Result<Option<TomlConfig>, String> {
        let Some(path) = config_file_path(self.cli_config_path.as_deref()) else {
            return Ok(None);
        };
        match load_toml_config(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(Some(config))
            }
            Err(e) => Err(format!("Ignoring config file {}: {}", path.display(), e)),
        }
    }
}

/// Locate the TOML config file
///
/// An explicit path (CLI, then `FONO_CONFIG`) is returned as-is even when it
/// does not exist, so the caller can report it. Otherwise the user config dir
/// is tried before `/etc`.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Validate a base URL and strip trailing slashes
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API URL must start with http:// or https://: {:?}",
            url
        )));
    }
    let host = trimmed.split_once("://").map(|(_, rest)| rest).unwrap_or_default();
    if host.is_empty() {
        return Err(Error::Config(format!("API URL has no host: {:?}", url)));
    }
    Ok(trimmed.to_string())
}
