use crate::construct::LcpAlgorithm;
use crate::int_vector::DEFAULT_BUFFER_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sdix";
const CONFIG_FILE: &str = "config.json";

/// Build defaults stored in the platform config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Cache directory for runs that name none
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Window size, in elements, of streamed artifacts
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// LCP algorithm for `build --artifact lcp` without `--lcp`
    #[serde(default)]
    pub lcp_algorithm: LcpAlgorithm,

    /// Remove cached artifacts after a successful build
    #[serde(default)]
    pub delete_files: bool,
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            buffer_size: default_buffer_size(),
            lcp_algorithm: LcpAlgorithm::default(),
            delete_files: false,
        }
    }
}

impl BuildConfig {
    /// Load the user's config, or defaults if there is none.
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BuildConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

/// Path of the config file, if the platform has a config directory.
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILE))
}
