use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable thresholds used by every analytics stage.
///
/// Every field can be overridden from the `[engine]` table of the user
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Average grid power (kW) at or above which a session counts as DC
    pub dc_power_threshold_kw: f64,
    /// Grid-to-battery efficiency assumed for DC sessions without a battery delta
    pub dc_efficiency: f64,
    /// Grid-to-battery efficiency assumed for AC sessions without a battery delta
    pub ac_efficiency: f64,
    /// Minimum battery-side energy (kWh) for a capacity sample
    pub min_energy_added_kwh: f64,
    /// Minimum SoC increase (percentage points) for a capacity sample
    pub min_soc_delta: f64,
    pub similarity_threshold: f64,
    pub unknown_similarity_threshold: f64,
    /// Length of every provider leaderboard
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dc_power_threshold_kw: 12.0,
            dc_efficiency: 0.98,
            ac_efficiency: 0.92,
            min_energy_added_kwh: 30.0,
            min_soc_delta: 20.0,
            similarity_threshold: 0.35,
            unknown_similarity_threshold: 0.25,
            top_n: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("dc_efficiency", self.dc_efficiency)?;
        check_fraction("ac_efficiency", self.ac_efficiency)?;
        check_fraction("similarity_threshold", self.similarity_threshold)?;
        check_fraction(
            "unknown_similarity_threshold",
            self.unknown_similarity_threshold,
        )?;

        check_non_negative("dc_power_threshold_kw", self.dc_power_threshold_kw)?;
        check_non_negative("min_energy_added_kwh", self.min_energy_added_kwh)?;

        // A zero delta would make the capacity estimate divide by zero
        if !self.min_soc_delta.is_finite() || self.min_soc_delta <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "min_soc_delta",
                reason: format!("must be greater than 0, got {}", self.min_soc_delta),
            });
        }

        if self.top_n == 0 {
            return Err(ConfigError::Invalid {
                field: "top_n",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be between 0 and 1, got {}", value),
        })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative number, got {}", value),
        })
    }
}
