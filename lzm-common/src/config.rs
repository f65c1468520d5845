//! Configuration loading and resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`LZM_API_BASE_URL`, `LZM_STATE_DIR`, `LZM_CONFIG`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Backend used during local development
pub const LOCAL_API_BASE_URL: &str = "http://localhost:5000";

/// Deployed backend origin
pub const DEPLOYED_API_BASE_URL: &str = "https://rizardmathch-4.onrender.com";

pub const ENV_API_BASE_URL: &str = "LZM_API_BASE_URL";
pub const ENV_STATE_DIR: &str = "LZM_STATE_DIR";
pub const ENV_CONFIG: &str = "LZM_CONFIG";

const APP_DIR: &str = "lizardmatch";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Explicit backend base URL; bypasses host-based resolution
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Hostname the client is served from (`localhost` selects the local backend)
    #[serde(default)]
    pub host: Option<String>,

    /// Folder holding `session.json` and `local.json`
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub survey: SurveyConfig,

    #[serde(default)]
    pub dex: DexConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

/// Survey submission settings
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    #[serde(default = "default_top_n")]
    pub top_n: u32,

    #[serde(default = "default_true")]
    pub include_reasons: bool,

    /// `standard` or `compact`
    #[serde(default = "default_weight_profile")]
    pub weight_profile: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            include_reasons: true,
            weight_profile: default_weight_profile(),
        }
    }
}

/// Dex browser settings
#[derive(Debug, Clone, Deserialize)]
pub struct DexConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_top_n() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_weight_profile() -> String {
    "standard".to_string()
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_list_limit() -> u32 {
    500
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load from the CLI path, `LZM_CONFIG`, or the platform default location
    ///
    /// Falls back to defaults with a warning when no usable file exists.
    pub fn load(cli_path: Option<&Path>) -> Self {
        let candidate = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from))
            .or_else(default_config_path);

        match candidate {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            Some(path) => {
                if cli_path.is_some() {
                    warn!("Config file {} not found; using defaults", path.display());
                }
                Self::default()
            }
            None => Self::default(),
        }
    }
}

/// Platform config file location (`<config_dir>/lizardmatch/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Base URL for a hostname: local hosts use the local backend, everything
/// else the deployed origin
pub fn api_base_url_for_host(host: Option<&str>) -> &'static str {
    match host {
        Some("localhost") | Some("127.0.0.1") => LOCAL_API_BASE_URL,
        _ => DEPLOYED_API_BASE_URL,
    }
}

/// Resolve the backend base URL by priority order
pub fn resolve_api_base_url(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    if let Some(url) = cli_arg {
        return trim_base_url(url);
    }

    if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
        if !url.trim().is_empty() {
            return trim_base_url(&url);
        }
    }

    if let Some(url) = &config.api_base_url {
        return trim_base_url(url);
    }

    api_base_url_for_host(config.host.as_deref()).to_string()
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Resolve the state folder by priority order
pub fn resolve_state_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ENV_STATE_DIR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.state_dir {
        return path.clone();
    }

    default_state_dir()
}

/// OS-dependent default state folder
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./lizardmatch_data"))
}

/// Session-scoped store file inside the state folder
pub fn session_store_path(state_dir: &Path) -> PathBuf {
    state_dir.join("session.json")
}

/// Origin-scoped store file inside the state folder
pub fn local_store_path(state_dir: &Path) -> PathBuf {
    state_dir.join("local.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_sentinel() {
        assert_eq!(api_base_url_for_host(Some("localhost")), LOCAL_API_BASE_URL);
        assert_eq!(api_base_url_for_host(Some("127.0.0.1")), LOCAL_API_BASE_URL);
        assert_eq!(api_base_url_for_host(Some("example.github.io")), DEPLOYED_API_BASE_URL);
        assert_eq!(api_base_url_for_host(None), DEPLOYED_API_BASE_URL);
    }

    #[test]
    fn test_cli_base_url_wins_and_is_trimmed() {
        let config = TomlConfig {
            api_base_url: Some("http://from-toml".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_api_base_url(Some("http://cli:9000/"), &config),
            "http://cli:9000"
        );
    }

    #[test]
    fn test_parse_full_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            host = "localhost"
            state_dir = "/tmp/lzm"

            [logging]
            level = "debug"

            [survey]
            top_n = 5
            weight_profile = "compact"

            [dex]
            debounce_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.survey.top_n, 5);
        assert!(config.survey.include_reasons);
        assert_eq!(config.survey.weight_profile, "compact");
        assert_eq!(config.dex.debounce_ms, 50);
        assert_eq!(config.dex.list_limit, 500);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.survey.top_n, 10);
        assert_eq!(config.dex.debounce_ms, 200);
    }

    #[test]
    fn test_store_paths() {
        let dir = Path::new("/var/lzm");
        assert_eq!(session_store_path(dir), PathBuf::from("/var/lzm/session.json"));
        assert_eq!(local_store_path(dir), PathBuf::from("/var/lzm/local.json"));
    }
}
