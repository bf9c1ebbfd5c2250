//! Engine configuration: thresholds, paging and chart window.
//!
//! # Responsibility
//! - Load tunables from a JSON file with every field defaulted.
//! - Apply `SITELENS_*` environment overrides on top of file values.
//!
//! # Invariants
//! - A loaded config always passes [`EngineConfig::validate`].
//! - Blank or unparseable environment values are ignored, not errors.

use crate::engine::aggregate::DEFAULT_MONTH_WINDOW;
use crate::engine::criteria::{Thresholds, HIGH_ACTIVITY_THRESHOLD, HIGH_COST_THRESHOLD};
use crate::engine::paginate::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PAGE_SIZE: &str = "SITELENS_PAGE_SIZE";
pub const ENV_MONTH_WINDOW: &str = "SITELENS_MONTH_WINDOW";
pub const ENV_HIGH_COST: &str = "SITELENS_HIGH_COST";
pub const ENV_HIGH_ACTIVITY: &str = "SITELENS_HIGH_ACTIVITY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub default_page_size: usize,
    /// Number of most recent months kept in trend series.
    pub month_window: usize,
    pub high_cost_threshold: f64,
    pub high_activity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            month_window: DEFAULT_MONTH_WINDOW,
            high_cost_threshold: HIGH_COST_THRESHOLD,
            high_activity_threshold: HIGH_ACTIVITY_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, then applies environment overrides.
    ///
    /// # Errors
    /// - Returns [`ConfigError::Io`] when the file cannot be read.
    /// - Returns [`ConfigError::Json`] for malformed JSON.
    /// - Returns [`ConfigError::Invalid`] when the merged values are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::resolve(Some(path.as_ref()), |name| std::env::var(name).ok())
    }

    /// Starts from `path` (or defaults when `None`), applies overrides read
    /// through `lookup`, then validates the merged result.
    ///
    /// # Errors
    /// Same as [`EngineConfig::load`]; an override such as
    /// `SITELENS_MONTH_WINDOW=0` yields [`ConfigError::Invalid`].
    pub fn resolve(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_json::from_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides_from(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Applies `SITELENS_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides read through `lookup`.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = read(ENV_PAGE_SIZE).and_then(|v| v.parse().ok()) {
            self.default_page_size = value;
        }
        if let Some(value) = read(ENV_MONTH_WINDOW).and_then(|v| v.parse().ok()) {
            self.month_window = value;
        }
        if let Some(value) = read(ENV_HIGH_COST).and_then(|v| v.parse().ok()) {
            self.high_cost_threshold = value;
        }
        if let Some(value) = read(ENV_HIGH_ACTIVITY).and_then(|v| v.parse().ok()) {
            self.high_activity_threshold = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(invalid("defaultPageSize", "must be at least 1"));
        }
        if self.month_window == 0 {
            return Err(invalid("monthWindow", "must be at least 1"));
        }
        check_threshold("highCostThreshold", self.high_cost_threshold)?;
        check_threshold("highActivityThreshold", self.high_activity_threshold)?;
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            high_cost: self.high_cost_threshold,
            high_activity: self.high_activity_threshold,
        }
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}

fn check_threshold(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            message: format!("must be a non-negative number, got {value}"),
        });
    }
    Ok(())
}
