use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EPS, DEFAULT_MAX_COMPONENTS, DEFAULT_MIN_SAMPLES,
    DEFAULT_REDUCTION_THRESHOLD, FEATURE_CROP_SIZE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} {reason}, got {value}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
        value: String,
    },
}

/// Tunables of one identification run.
///
/// `eps` is tied to the feature space produced with `crop_size`; changing
/// either one means re-validating the other against real batches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    pub eps: f64,
    pub min_samples: usize,
    pub reduction_threshold: usize,
    pub max_components: usize,
    pub crop_size: u32,
    pub batch_size: usize,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
            reduction_threshold: DEFAULT_REDUCTION_THRESHOLD,
            max_components: DEFAULT_MAX_COMPONENTS,
            crop_size: FEATURE_CROP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl IdentificationConfig {
    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(invalid("eps", "must be a positive finite number", self.eps));
        }
        if self.min_samples == 0 {
            return Err(invalid("min_samples", "must be at least 1", self.min_samples));
        }
        if self.max_components == 0 {
            return Err(invalid(
                "max_components",
                "must be at least 1",
                self.max_components,
            ));
        }
        if self.crop_size == 0 {
            return Err(invalid("crop_size", "must be at least 1", self.crop_size));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1", self.batch_size));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason,
        value: value.to_string(),
    }
}
