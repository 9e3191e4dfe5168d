//! Configuration management for Opositor

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the question bank (sections as subdirectories)
    pub bank_dir: PathBuf,

    /// Path of the results history file
    pub results_file: PathBuf,
}

impl Config {
    /// Load configuration from disk, or create the default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::defaults()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "opositor").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "opositor").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Default paths under the platform data directory
    fn defaults() -> Result<Self> {
        let data_dir = Self::data_dir()?;
        Ok(Self { bank_dir: data_dir.join("tests"), results_file: data_dir.join("results.json") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = Config {
            bank_dir: PathBuf::from("/tmp/banco"),
            results_file: PathBuf::from("/tmp/results.json"),
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn config_deserializes_from_json() {
        let json = r#"{"bank_dir":"tests_json","results_file":"results.json"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.bank_dir, PathBuf::from("tests_json"));
        assert_eq!(config.results_file, PathBuf::from("results.json"));
    }
}
