//! Planner configuration.
//!
//! Loaded from a TOML file so the discount and tolerances can change without
//! recompiling.
//!
//! ```
//! use mdp_lp::config::LpConfig;
//!
//! let config = LpConfig::from_toml_str(r#"
//!     gamma = 0.9
//!     probability_tolerance = 1e-9
//!
//!     [export]
//!     model_path = "model.lp"
//! "#).unwrap();
//!
//! assert_eq!(config.gamma, 0.9);
//! assert_eq!(config.model_path().unwrap().to_str(), Some("model.lp"));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LpConfig {
    /// Discount factor applied to future reward.
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Allowed deviation of `Σ p(s,a,·)` from 1.
    #[serde(default = "default_tolerance")]
    pub probability_tolerance: f64,

    /// Allowed violation of a Bellman constraint by the solved values.
    #[serde(default = "default_tolerance")]
    pub feasibility_tolerance: f64,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Where to write the LP model. Nothing is written when unset.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

fn default_gamma() -> f64 {
    1.0
}

fn default_tolerance() -> f64 {
    1e-6
}

impl Default for LpConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            probability_tolerance: default_tolerance(),
            feasibility_tolerance: default_tolerance(),
            export: ExportConfig::default(),
        }
    }
}

impl LpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails [`LpConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Self {
        self.probability_tolerance = tolerance;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tolerance: f64) -> Self {
        self.feasibility_tolerance = tolerance;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export.model_path = Some(path.into());
        self
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.export.model_path.as_deref()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Invalid(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }

        for (name, tol) in [
            ("probability_tolerance", self.probability_tolerance),
            ("feasibility_tolerance", self.feasibility_tolerance),
        ] {
            if !tol.is_finite() || tol <= 0. {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {tol}"
                )));
            }
        }

        Ok(())
    }
}
