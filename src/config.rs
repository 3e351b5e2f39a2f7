//! User configuration (~/.config/snipwatch/config.toml)

use anyhow::{Context, Result, bail};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::frequency::{FREQUENCY_THRESHOLD, FREQUENCY_WINDOW_DAYS, MIN_CODE_BLOCK_SIZE};
use crate::search::MAX_SUGGESTIONS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub suggestions: SuggestionsConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
}

/// Frequency detection policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub min_block_size: usize,
    pub threshold: usize,
    pub window_days: i64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_block_size: MIN_CODE_BLOCK_SIZE,
            threshold: FREQUENCY_THRESHOLD,
            window_days: FREQUENCY_WINDOW_DAYS,
        }
    }
}

/// Longest tracking window accepted from the config file
pub const MAX_WINDOW_DAYS: i64 = 3650;

impl TrackingConfig {
    /// Trailing window occurrences are counted in.
    ///
    /// Out-of-range values are clamped to `1..=MAX_WINDOW_DAYS`; `validate`
    /// rejects them when they come from a file.
    pub fn window(&self) -> Duration {
        Duration::days(self.window_days.clamp(1, MAX_WINDOW_DAYS))
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            bail!(
                "tracking.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS,
                self.window_days
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub max_results: usize,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_SUGGESTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snipwatch").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .tracking
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads the global config, falling back to defaults when none exists
    pub fn load() -> Result<Self> {
        match Self::global_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[tracking]\nthreshold = 5\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.tracking.threshold, 5);
        assert_eq!(config.tracking.min_block_size, 50);
        assert_eq!(config.tracking.window(), Duration::days(7));
        assert_eq!(config.suggestions.max_results, 5);
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.storage.data_dir, None);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend.base_url = "http://10.0.0.2:8080".into();
        config.storage.data_dir = Some(temp.path().join("data"));
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "tracking = [").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_window_days_out_of_range_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        for days in ["0", "-1", "200000000"] {
            std::fs::write(&path, format!("[tracking]\nwindow_days = {days}\n")).unwrap();
            let err = Config::from_file(&path).unwrap_err();
            assert!(format!("{:#}", err).contains("window_days"), "{days}: {err:#}");
        }

        std::fs::write(&path, "[tracking]\nwindow_days = 3650\n").unwrap();
        assert_eq!(
            Config::from_file(&path).unwrap().tracking.window(),
            Duration::days(MAX_WINDOW_DAYS)
        );
    }

    #[test]
    fn test_window_is_clamped_when_built_directly() {
        let mut tracking = TrackingConfig::default();
        tracking.window_days = 200_000_000;
        assert_eq!(tracking.window(), Duration::days(MAX_WINDOW_DAYS));
        tracking.window_days = -1;
        assert_eq!(tracking.window(), Duration::days(1));
    }
}
