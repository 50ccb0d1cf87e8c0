//! Application configuration.
//!
//! Values are layered: built-in defaults, then `<config_dir>/ksrtc/config.toml`,
//! then `KSRTC_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{engine::BookingEngine, reference::ReferenceData};

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "ksrtc";
/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# KSRTC ticket booking configuration.

# Optional JSON file with routes, distances and bus types. The built-in
# KSRTC network is used when unset.
# reference_data = "/path/to/network.json"

# Remember issued ticket and bus numbers and redraw duplicates.
unique_ids = false

# Pause shown while a booking is processed, in milliseconds.
processing_delay_ms = 2000

# Directory for ksrtc.log.
log_dir = "logs"
"#;

/// Runtime settings for the booking application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON reference data overriding the built-in network.
    #[serde(default)]
    pub reference_data: Option<PathBuf>,
    /// Enable the issued-identifier registry.
    pub unique_ids: bool,
    /// Delay before a completed booking is priced and issued.
    pub processing_delay_ms: u64,
    /// Where the log file is written.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reference_data: None,
            unique_ids: false,
            processing_delay_ms: 2000,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load from the default config file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from an explicit file (which may be absent) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("unique_ids", defaults.unique_ids)?
            .set_default("processing_delay_ms", defaults.processing_delay_ms as i64)?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("KSRTC"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Reference data named by the config, or the built-in network.
    pub fn reference_data(&self) -> Result<ReferenceData> {
        match &self.reference_data {
            Some(path) => ReferenceData::load(path),
            None => Ok(ReferenceData::default()),
        }
    }

    /// Construct a production engine from these settings.
    pub fn engine(&self) -> Result<BookingEngine> {
        let data = self.reference_data()?;
        Ok(BookingEngine::new(data).with_unique_ids(self.unique_ids))
    }
}

/// Location of the user's configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_round_trips_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ksrtc").join(CONFIG_FILE);
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.processing_delay_ms, 2000);
        assert!(config.reference_data()?.bus_type("Luxury").is_some());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let data_path = dir.path().join("network.json");
        fs::write(
            &data_path,
            serde_json::to_string_pretty(&ReferenceData::default())?,
        )?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            format!(
                "reference_data = {:?}\nunique_ids = true\nprocessing_delay_ms = 0\n",
                data_path.display().to_string()
            ),
        )?;

        let config = AppConfig::load_from(&path)?;
        assert!(config.unique_ids);
        assert_eq!(config.processing_delay_ms, 0);
        assert_eq!(config.reference_data.as_deref(), Some(data_path.as_path()));
        assert_eq!(config.reference_data()?, ReferenceData::default());
        Ok(())
    }

    #[test]
    fn existing_file_is_left_untouched() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "unique_ids = true\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "unique_ids = true\n");
        Ok(())
    }
}
