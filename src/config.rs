use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::processing::sharpness::DEFAULT_THRESHOLD;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Reduction used to turn a Laplacian response into a score.
pub enum Measure {
    /// Population variance of every filtered sample.
    #[default]
    Variance,
    /// Mean of the filtered samples above the threshold.
    ThresholdAverage,
}

impl Measure {
    /// Parses user-facing names; `None` for anything unrecognised.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "variance" | "var" => Some(Measure::Variance),
            "average" | "avg" | "threshold" | "threshold_average" => {
                Some(Measure::ThresholdAverage)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Persisted sharpness settings.
pub struct SharpnessConfig {
    pub measure: Measure,
    pub threshold: f64,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            measure: Measure::Variance,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SharpnessConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sharpness").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match Self::from_toml_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring config: {err:#}");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("invalid sharpness config")
    }
}
