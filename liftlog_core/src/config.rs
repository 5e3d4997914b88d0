//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::{Error, Result, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub units: UnitsConfig,

    #[serde(default)]
    pub timer: TimerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Unit preferences
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    #[serde(default)]
    pub weight: WeightUnit,
}

/// Rest timer parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Rest used when a prescription omits a rest interval
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    /// Step size for CLI +/- rest adjustments
    #[serde(default = "default_adjust_step_seconds")]
    pub adjust_step_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_rest_seconds: default_rest_seconds(),
            adjust_step_seconds: default_adjust_step_seconds(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("liftlog")
}

fn default_rest_seconds() -> u32 {
    120
}

fn default_adjust_step_seconds() -> u32 {
    15
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("liftlog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.units.weight, WeightUnit::Kg);
        assert_eq!(config.timer.default_rest_seconds, 120);
        assert_eq!(config.timer.adjust_step_seconds, 15);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.timer.default_rest_seconds,
            parsed.timer.default_rest_seconds
        );
        assert_eq!(config.units.weight, parsed.units.weight);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[timer]
default_rest_seconds = 90

[units]
weight = "lb"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timer.default_rest_seconds, 90);
        assert_eq!(config.timer.adjust_step_seconds, 15); // default
        assert_eq!(config.units.weight, WeightUnit::Lb);
    }
}
