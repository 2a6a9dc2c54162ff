//! Configuration loading

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Built WASM bundle and index.html
    #[serde(default = "default_web")]
    pub web: PathBuf,
    /// Environment map and model files
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            web: default_web(),
            assets: default_assets(),
        }
    }
}

fn default_web() -> PathBuf {
    PathBuf::from("web")
}

fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}

/// Load configuration from file, or use defaults if not found
pub fn load_config(path: &Path) -> Result<ServeConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: ServeConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ServeConfig::default())
    }
}
