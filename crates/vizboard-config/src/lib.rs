//! Configuration loading for Vizboard.
//! Reads vizboard.toml from the current directory or the path in the
//! VIZBOARD_CONFIG env var. Every field has a default, so a missing file
//! yields the default configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use vizboard_charts::svg::parse_hex;

pub const CONFIG_ENV_VAR: &str = "VIZBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "vizboard.toml";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Malformed config file {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Optional directory served under /static.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_bind()             -> String { "127.0.0.1:3001".to_string() }
fn default_max_upload_bytes() -> usize  { 25 * 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset tried before falling back to an upload. Unset means an
    /// upload is always required.
    #[serde(default)]
    pub default_path: Option<PathBuf>,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_preview_rows() -> usize { 50 }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { default_path: None, preview_rows: default_preview_rows() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "vizboard_charts::default_palette")]
    pub palette: Vec<String>,
}

fn default_width()  -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for ChartConfig {
    fn default() -> Self {
        Self { width: default_width(), height: default_height(), palette: vizboard_charts::default_palette() }
    }
}

impl Config {
    /// Load configuration from vizboard.toml.
    /// Checks VIZBOARD_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);

        if !path.exists() {
            warn!("Config file not found: {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be > 0".into()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart.width and chart.height must be > 0".into()));
        }
        if self.chart.palette.is_empty() {
            return Err(ConfigError::Invalid("chart.palette must name at least one colour".into()));
        }
        if let Some(bad) = self.chart.palette.iter().find(|c| parse_hex(c).is_none()) {
            return Err(ConfigError::Invalid(format!("chart.palette entry is not #rrggbb: {bad}")));
        }
        if self.dataset.preview_rows == 0 {
            return Err(ConfigError::Invalid("dataset.preview_rows must be > 0".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.server.bind)))
    }
}
