//! Configuration loading and data folder resolution
//!
//! Resolution priority for the data folder:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "NEURORADIO_DATA";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Folder holding the database and media blobs
    pub data_folder: PathBuf,
    /// Crossfade ramp window in seconds
    pub crossfade_seconds: f64,
    /// Background generation interval in minutes
    pub scheduler_interval_minutes: u64,
    /// Duration of generated placeholder tracks in seconds
    pub generated_duration_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5780,
            data_folder: default_data_folder(),
            crossfade_seconds: 3.0,
            scheduler_interval_minutes: 30,
            generated_duration_seconds: 180,
        }
    }
}

impl Config {
    /// Load configuration, merging the optional TOML file with CLI overrides
    pub fn load(
        config_file: Option<&Path>,
        cli_port: Option<u16>,
        cli_data_folder: Option<&Path>,
    ) -> Result<Config> {
        let mut config = match config_file.map(PathBuf::from).or_else(find_config_file) {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            None => Config::default(),
        };

        if let Ok(env_folder) = std::env::var(DATA_FOLDER_ENV) {
            config.data_folder = PathBuf::from(env_folder);
        }
        if let Some(folder) = cli_data_folder {
            config.data_folder = folder.to_path_buf();
        }
        if let Some(port) = cli_port {
            config.port = port;
        }

        if config.crossfade_seconds <= 0.0 {
            return Err(Error::Config(
                "crossfade_seconds must be positive".to_string(),
            ));
        }

        Ok(config)
    }

    /// SQLite database file inside the data folder
    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join("neuroradio.db")
    }

    /// Media blob root inside the data folder
    pub fn media_root(&self) -> PathBuf {
        self.data_folder.join("media")
    }
}

/// Default configuration file path for the platform
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("neuroradio").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/neuroradio/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("neuroradio"))
        .unwrap_or_else(|| PathBuf::from("./neuroradio_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5780);
        assert_eq!(config.crossfade_seconds, 3.0);
        assert_eq!(config.scheduler_interval_minutes, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.generated_duration_seconds, 180);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "port = 9000\ncrossfade_seconds = 5.0").unwrap();

        let config = Config::load(Some(&file), Some(7000), Some(dir.path())).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.crossfade_seconds, 5.0);
        assert_eq!(config.data_folder, dir.path());
    }

    #[test]
    fn test_rejects_nonpositive_crossfade() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "crossfade_seconds = 0.0").unwrap();

        assert!(Config::load(Some(&file), None, None).is_err());
    }
}
