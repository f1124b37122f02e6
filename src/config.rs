use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{Context, OptionExt, ensure};
use serde::{Deserialize, Serialize};

use crate::services::provisioner::DEFAULT_PLAYLIST_DESCRIPTION;
use crate::spotify_rs::client::DEFAULT_REQUEST_TIMEOUT;
use crate::spotify_rs::endpoints::SPOTIFY_API_BASE_URL;
use crate::spotify_rs::pagination::DEFAULT_MAX_PAGES;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub mix: MixConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_pages: usize,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base_url: SPOTIFY_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl SpotifyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults for the `generate` command, each overridable on the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub name: String,
    pub blocks: usize,
    pub block_size: usize,
    pub with_podcasts: bool,
    pub max_concurrent_recommendations: usize,
    pub description: String,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            name: "Random Daily Drive".to_string(),
            blocks: 10,
            block_size: 5,
            with_podcasts: false,
            max_concurrent_recommendations: 1,
            description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .wrap_err(format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Rejects values that would make every run fail or misbehave
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.spotify.request_timeout_secs > 0,
            "spotify.request_timeout_secs must be at least 1"
        );
        ensure!(self.spotify.max_pages > 0, "spotify.max_pages must be at least 1");
        ensure!(!self.mix.name.is_empty(), "mix.name must not be empty");
        ensure!(self.mix.blocks > 0, "mix.blocks must be at least 1");
        ensure!(
            self.mix.block_size >= 2,
            "mix.block_size must be at least 2, got {}",
            self.mix.block_size
        );
        ensure!(
            self.mix.max_concurrent_recommendations > 0,
            "mix.max_concurrent_recommendations must be at least 1"
        );
        Ok(())
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("daily-drive").join("config.toml"))
    }

    /// Load the default config file, falling back to defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize default config")?;
        std::fs::write(path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;
        Ok(true)
    }

    /// Create the default config file at the default path, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory on this platform")?;
        if !Self::write_default(&path)? {
            log::info!("Config file already exists at {}", path.display());
        }
        Ok(path)
    }
}
