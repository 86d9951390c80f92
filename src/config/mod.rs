//! Configuration management for the comment scraper
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default browser user agent sent to the comment API
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment API client configuration
    pub client: ClientConfig,

    /// Output file configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Comment API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host of the comment API
    pub base_url: String,

    /// Application id constant sent as `aid`
    pub app_id: u32,

    /// Records requested per page (`count`)
    pub page_size: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Enable cookie persistence across requests
    pub enable_cookies: bool,
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving per-video and summary files
    pub dir: PathBuf,

    /// Write `{video_id}.txt` next to the JSON file
    pub write_text: bool,

    /// Write `{video_id}_comments.csv` and `videos_summary.csv`
    pub write_csv: bool,

    /// Handlebars template replacing the built-in text report
    pub template: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://www.tiktok.com"),
            app_id: 1988,
            page_size: 50,
            request_timeout_secs: 30,
            user_agent: String::from(DEFAULT_USER_AGENT),
            enable_cookies: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("scraped_data"),
            write_text: true,
            write_csv: true,
            template: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let client = ClientConfig {
            base_url: std::env::var("TOKCOMMENTS_BASE_URL").unwrap_or(defaults.client.base_url),
            app_id: env_parse("TOKCOMMENTS_APP_ID").unwrap_or(defaults.client.app_id),
            page_size: env_parse("TOKCOMMENTS_PAGE_SIZE").unwrap_or(defaults.client.page_size),
            request_timeout_secs: env_parse("TOKCOMMENTS_REQUEST_TIMEOUT")
                .unwrap_or(defaults.client.request_timeout_secs),
            user_agent: std::env::var("TOKCOMMENTS_USER_AGENT")
                .unwrap_or(defaults.client.user_agent),
            enable_cookies: env_parse("TOKCOMMENTS_ENABLE_COOKIES")
                .unwrap_or(defaults.client.enable_cookies),
        };

        let output = OutputConfig {
            dir: std::env::var("TOKCOMMENTS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output.dir),
            write_text: env_parse("TOKCOMMENTS_WRITE_TEXT").unwrap_or(defaults.output.write_text),
            write_csv: env_parse("TOKCOMMENTS_WRITE_CSV").unwrap_or(defaults.output.write_csv),
            template: std::env::var("TOKCOMMENTS_TEMPLATE")
                .ok()
                .map(PathBuf::from)
                .or(defaults.output.template),
        };

        let logging = LoggingConfig {
            level: std::env::var("TOKCOMMENTS_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("TOKCOMMENTS_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        let config = Self {
            client,
            output,
            logging,
        };
        config
            .validate()
            .context("Invalid configuration from environment")?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.client.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        if self.client.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.client.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.client.base_url))?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "log format must be \"text\" or \"json\", got {:?}",
                self.logging.format
            );
        }

        Ok(())
    }
}

impl ClientConfig {
    /// Per-request timeout applied by the HTTP client
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
