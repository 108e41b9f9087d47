//! Dashboard configuration.
//!
//! Loaded from JSON. Search order:
//! 1. Explicit path (`--config`)
//! 2. `dashboard.json` in the working directory
//! 3. Built-in defaults
//!
//! Every field is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Tab;

const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Which set of tabs the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// All four tabs, including the whole-dataset overviews.
    #[default]
    Full,
    /// Only the tabs driven by the filtered view.
    Compact,
}

impl Variant {
    pub fn tabs(self) -> &'static [Tab] {
        match self {
            Variant::Full => &[
                Tab::RentalPatterns,
                Tab::Rfm,
                Tab::WeatherSeasons,
                Tab::WeekdayWeekend,
            ],
            Variant::Compact => &[Tab::WeatherSeasons],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("recency_bins must be at least 1")]
    ZeroBins,
    #[error("window_size must be positive, got {0:?}")]
    BadWindowSize([f32; 2]),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    /// CSV file with the merged hourly/daily data.
    pub data_path: PathBuf,
    pub variant: Variant,
    /// Bins in the recency histogram.
    pub recency_bins: usize,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Apply the filters to the overview tabs as well.
    pub filter_all_tabs: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("all_data.csv"),
            variant: Variant::Full,
            recency_bins: 30,
            window_size: [1200.0, 800.0],
            filter_all_tabs: false,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recency_bins == 0 {
            return Err(ConfigError::ZeroBins);
        }
        if self.window_size.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::BadWindowSize(self.window_size));
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the configuration for a run: explicit file, then the default
    /// file in `dir`, then defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            log::info!("Using config {}", path.display());
            return Self::from_file(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::info!("Using config {}", candidate.display());
            return Self::from_file(&candidate);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.data_path, PathBuf::from("all_data.csv"));
        assert_eq!(config.recency_bins, 30);
        assert_eq!(config.variant.tabs().len(), 4);
        assert!(!config.filter_all_tabs);
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{"variant": "compact", "recency_bins": 10}"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.variant, Variant::Compact);
        assert_eq!(config.recency_bins, 10);
        assert_eq!(config.window_size, [1200.0, 800.0]);
        assert_eq!(config.variant.tabs(), &[Tab::WeatherSeasons]);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"colour_scheme": "dark"}"#;
        let result: Result<DashboardConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_zero_bins() {
        let config: DashboardConfig = serde_json::from_str(r#"{"recency_bins": 0}"#).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ZeroBins));
    }

    #[test]
    fn test_reject_bad_window() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"window_size": [0.0, 600.0]}"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::BadWindowSize(_))));
    }

    #[test]
    fn test_discover_prefers_explicit_then_default_file() {
        let dir = tempfile::tempdir().unwrap();

        let config = DashboardConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, DashboardConfig::default());

        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"data_path": "day.csv"}"#,
        )
        .unwrap();
        let config = DashboardConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("day.csv"));

        let explicit = dir.path().join("other.json");
        fs::write(&explicit, r#"{"variant": "compact"}"#).unwrap();
        let config = DashboardConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.variant, Variant::Compact);
        assert_eq!(config.data_path, PathBuf::from("all_data.csv"));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(DashboardConfig::discover(Some(&missing), dir.path()).is_err());
    }
}
