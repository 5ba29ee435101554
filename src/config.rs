use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::AcquisitionTuning;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Where tagged locations are stored
    pub data_file: String,
    /// Accuracy radius (meters) at which a fix is good enough
    pub desired_accuracy_m: f64,
    /// Discard samples measured more than this many seconds ago
    pub stale_after_seconds: f64,
    /// Samples closer than this (meters) count as the same spot
    pub same_spot_radius_m: f64,
    /// Stop searching after this long with no improvement at one spot
    pub no_improvement_seconds: f64,
    /// Wall-clock budget for one acquisition session
    pub deadline_seconds: f64,
    /// Nominatim-compatible endpoint for reverse geocoding; the offline
    /// mock geocoder is used when unset
    pub geocoder_endpoint: Option<String>,
    /// User agent sent with geocoding requests
    pub geocoder_user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        let tuning = AcquisitionTuning::default();
        Self {
            data_file: "data/locations.yaml".to_string(),
            desired_accuracy_m: tuning.desired_accuracy_m,
            stale_after_seconds: tuning.stale_after_seconds,
            same_spot_radius_m: tuning.same_spot_radius_m,
            no_improvement_seconds: tuning.no_improvement_seconds,
            deadline_seconds: tuning.deadline_seconds,
            geocoder_endpoint: None,
            geocoder_user_agent: "loctag/0.3".to_string(),
        }
    }
}

impl Config {
    /// The acceptance-rule thresholds as the engine consumes them
    pub fn tuning(&self) -> AcquisitionTuning {
        AcquisitionTuning {
            desired_accuracy_m: self.desired_accuracy_m,
            stale_after_seconds: self.stale_after_seconds,
            same_spot_radius_m: self.same_spot_radius_m,
            no_improvement_seconds: self.no_improvement_seconds,
            deadline_seconds: self.deadline_seconds,
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    pub fn get_config_path(config_arg: &Option<PathBuf>) -> PathBuf {
        config_arg
            .clone()
            .unwrap_or_else(|| PathBuf::from("loctag.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.data_file, "data/locations.yaml");
        assert_eq!(config.desired_accuracy_m, 10.0);
        assert_eq!(config.stale_after_seconds, 5.0);
        assert_eq!(config.same_spot_radius_m, 1.0);
        assert_eq!(config.no_improvement_seconds, 10.0);
        assert_eq!(config.deadline_seconds, 60.0);
        assert!(config.geocoder_endpoint.is_none());
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("loctag.yaml");

        let config = Config::default();
        config.save_to_file(&config_path)?;

        let loaded_config = Config::load_from_file(&config_path)?;

        assert_eq!(config.data_file, loaded_config.data_file);
        assert_eq!(config.desired_accuracy_m, loaded_config.desired_accuracy_m);
        assert_eq!(config.deadline_seconds, loaded_config.deadline_seconds);
        assert_eq!(
            config.geocoder_user_agent,
            loaded_config.geocoder_user_agent
        );

        Ok(())
    }

    #[test]
    fn test_tuning_mirrors_config() {
        let mut config = Config::default();
        config.desired_accuracy_m = 25.0;
        config.deadline_seconds = 30.0;

        let tuning = config.tuning();
        assert_eq!(tuning.desired_accuracy_m, 25.0);
        assert_eq!(tuning.deadline_seconds, 30.0);
        assert_eq!(tuning.stale_after_seconds, 5.0);
    }
}
