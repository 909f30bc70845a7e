//! Configuration management for Unmask.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Command-line flags are applied on top by
//! the binary.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ScopeMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/unmask/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Traversal settings
    pub crawl: CrawlConfig,
    /// Headless browser settings
    pub browser: BrowserConfig,
    /// Plain HTTP settings (embedded resources)
    pub network: NetworkConfig,
    /// Address validation settings
    pub validation: ValidationConfig,
    /// Output sink settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `UNMASK_MAX_DEPTH`: Override the maximum crawl depth
    /// - `UNMASK_SCOPE_MODE`: Override the scope mode (1, 2 or 3)
    /// - `UNMASK_HEADLESS`: Override browser headless mode (true/false)
    /// - `UNMASK_USER_AGENT`: Override the user agent for the browser and for plain HTTP fetches
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("UNMASK_MAX_DEPTH") {
            match val.parse() {
                Ok(depth) => {
                    self.crawl.max_depth = depth;
                    tracing::debug!("Override crawl.max_depth from env: {}", depth);
                }
                Err(_) => tracing::warn!("Ignoring invalid UNMASK_MAX_DEPTH: {}", val),
            }
        }

        if let Some(val) = lookup("UNMASK_SCOPE_MODE") {
            match val.parse::<ScopeMode>() {
                Ok(mode) => {
                    self.crawl.scope_mode = mode;
                    tracing::debug!("Override crawl.scope_mode from env: {}", mode);
                }
                Err(e) => tracing::warn!("Ignoring UNMASK_SCOPE_MODE: {}", e),
            }
        }

        if let Some(val) = lookup("UNMASK_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("UNMASK_USER_AGENT") {
            if !val.trim().is_empty() {
                tracing::debug!("Override browser.user_agent and network.user_agent from env");
                self.network.user_agent = val.clone();
                self.browser.user_agent = Some(val);
            }
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.crawl.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crawl.max_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.crawl.max_addresses_per_page == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "crawl.max_addresses_per_page".to_string(),
                reason: "must be positive when set".to_string(),
            });
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.navigation_timeout_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.browser.script_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.script_timeout_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.network.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.fetch_timeout_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/unmask/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "unmask", "unmask").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum depth; the start page is depth 1
    pub max_depth: u32,
    /// Which discovered links are followed
    pub scope_mode: ScopeMode,
    /// Fetch a URL again when another branch reaches it
    pub allow_revisits: bool,
    /// Cap on addresses kept from a single page (unset = unlimited)
    pub max_addresses_per_page: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            scope_mode: ScopeMode::HostOnly,
            allow_revisits: false,
            max_addresses_per_page: None,
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Fixed user agent; a randomized desktop agent is used when unset
    pub user_agent: Option<String>,
    /// Launch the browser with cookies disabled
    pub disable_cookies: bool,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Timeout for a single `javascript:` expression, in milliseconds
    pub script_timeout_ms: u64,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Script evaluation timeout as a `Duration`.
    #[must_use]
    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            disable_cookies: false,
            navigation_timeout_secs: 30,
            script_timeout_ms: 2000,
        }
    }
}

/// Plain HTTP settings used for embedded SVG documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl NetworkConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 15,
            user_agent: concat!("Unmask/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Address validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Write every harvested address without validating it
    pub skip: bool,
    /// Timeout for one MX lookup, in seconds
    pub dns_timeout_secs: u64,
    /// Provider domains that reject short local parts
    pub strict_provider_domains: Vec<String>,
    /// Minimum local-part length at a strict provider
    pub strict_provider_min_local_len: usize,
}

impl ValidationConfig {
    /// MX lookup timeout as a `Duration`.
    #[must_use]
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            skip: false,
            dns_timeout_secs: 5,
            strict_provider_domains: vec!["gmail.com".to_string()],
            strict_provider_min_local_len: 6,
        }
    }
}

/// Output sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File receiving one address per line
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("emails.txt"),
        }
    }
}
