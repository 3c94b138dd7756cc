//! Engine configuration.
//!
//! All tuning constants are named configuration with defaults matching the
//! shipped behavior. Configs load from TOML files and round-trip through
//! serde, so deployments can override individual fields without code
//! changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming a TOML config file to load at startup.
pub const CONFIG_ENV_VAR: &str = "PULSECAM_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tuning for the finger-presence classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Minimum red channel value for a frame to count as finger contact.
    pub min_red: f32,
    /// Red must exceed green by this margin.
    pub red_over_green: f32,
    /// Red must exceed blue by this margin.
    pub red_over_blue: f32,
    /// Consecutive-frame count a confidence counter must strictly exceed
    /// before the detected boolean flips.
    pub confidence_threshold: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            min_red: 50.0,
            red_over_green: 10.0,
            red_over_blue: 10.0,
            confidence_threshold: 4,
        }
    }
}

/// Tuning for the sliding-window rate estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Sliding window capacity; oldest samples are evicted beyond this.
    pub max_samples: usize,
    /// Minimum buffered samples before any estimate is attempted.
    pub min_samples: usize,
    /// Minimum interval between successive estimate attempts.
    pub bpm_cooldown_sec: f64,
    /// Peak qualification threshold as a fraction of the window maximum.
    pub peak_threshold_ratio: f32,
    /// Minimum centered amplitude for the window to contain a usable pulse.
    pub min_peak_amplitude: f32,
    /// Lowest physiologically plausible rate.
    pub min_bpm: u32,
    /// Highest physiologically plausible rate.
    pub max_bpm: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_samples: 240,
            min_samples: 60,
            bpm_cooldown_sec: 1.0,
            peak_threshold_ratio: 0.3,
            min_peak_amplitude: 0.1,
            min_bpm: 40,
            max_bpm: 180,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub presence: PresenceConfig,
    pub estimator: EstimatorConfig,
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the path named by `PULSECAM_CONFIG`, falling back to
    /// defaults when the variable is unset or the file is unusable.
    pub fn from_env_or_default() -> Self {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => match Self::from_toml_file(Path::new(&path)) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring config at {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Reject configurations that cannot produce a working engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.estimator.min_samples == 0 {
            return Err(ConfigError::Validation(
                "estimator.min_samples must be at least 1".into(),
            ));
        }
        if self.estimator.min_samples > self.estimator.max_samples {
            return Err(ConfigError::Validation(format!(
                "estimator.min_samples ({}) exceeds max_samples ({})",
                self.estimator.min_samples, self.estimator.max_samples
            )));
        }
        if self.estimator.bpm_cooldown_sec < 0.0 {
            return Err(ConfigError::Validation(
                "estimator.bpm_cooldown_sec must be non-negative".into(),
            ));
        }
        if self.estimator.peak_threshold_ratio <= 0.0 || self.estimator.peak_threshold_ratio >= 1.0
        {
            return Err(ConfigError::Validation(
                "estimator.peak_threshold_ratio must be in (0, 1)".into(),
            ));
        }
        if self.estimator.min_peak_amplitude < 0.0 {
            return Err(ConfigError::Validation(
                "estimator.min_peak_amplitude must be non-negative".into(),
            ));
        }
        if self.estimator.min_bpm >= self.estimator.max_bpm {
            return Err(ConfigError::Validation(format!(
                "estimator BPM band [{}, {}] is inverted or empty",
                self.estimator.min_bpm, self.estimator.max_bpm
            )));
        }
        if !(0.0..=255.0).contains(&self.presence.min_red) {
            return Err(ConfigError::Validation(
                "presence.min_red must be within [0, 255]".into(),
            ));
        }
        Ok(())
    }
}
