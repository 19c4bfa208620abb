//! Uploader configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/gallery-upload/uploader.toml`
//! - Windows: `%APPDATA%/gallery-upload/uploader.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use gallery_upload::UploaderOptions;
use serde::{Deserialize, Serialize};

/// Uploader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Limit on a whole upload in seconds (0 = no limit).
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// Connection establishment limit in seconds (0 = no limit).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_filter() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 0,
            connect_timeout_secs: default_connect_timeout(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Loads configuration from the platform path, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Loads configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Transport options for the upload pipeline.
    pub fn uploader_options(&self) -> UploaderOptions {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        UploaderOptions {
            timeout: secs(self.request_timeout_secs),
            connect_timeout: secs(self.connect_timeout_secs),
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("gallery-upload")
            .join("uploader.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata)
            .join("gallery-upload")
            .join("uploader.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/gallery-upload/uploader.toml"))
    }
}
