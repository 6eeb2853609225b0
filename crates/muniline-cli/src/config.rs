//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for muniline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    pub http: HttpConfig,
    pub workers: WorkersConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub home_url: String,
    pub results_url: String,
    pub listing_marker: String,
    pub files_marker: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        let defaults = muniline_extract::EngineConfig::default();
        Self {
            home_url: defaults.home_url,
            results_url: defaults.results_url,
            listing_marker: defaults.listing_marker,
            files_marker: defaults.files_marker,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total timeout in seconds for each page fetch and download
    pub timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout: 120 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub default: usize,
    pub max: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self {
            default: cpus.min(4),
            max: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./data"),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./muniline.toml (current directory)
    /// 2. ~/.config/muniline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("muniline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "muniline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.portal.results_url.contains("resultados"));
        assert_eq!(config.http.timeout, 120);
        assert_eq!(config.output.default_dir, PathBuf::from("./data"));
        assert!(config.workers.default >= 1);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[portal]
results_url = "https://example.gov/resultados"

[http]
timeout = 30

[workers]
default = 2
max = 4

[output]
default_dir = "/tmp/dados"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.portal.results_url, "https://example.gov/resultados");
        // Unset portal fields keep their defaults
        assert!(config.portal.home_url.contains("gov.br"));
        assert_eq!(config.http.timeout, 30);
        assert_eq!(config.workers.default, 2);
        assert_eq!(config.output.default_dir, PathBuf::from("/tmp/dados"));
    }
}
