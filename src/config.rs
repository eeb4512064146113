//! Tracker configuration

use serde::{Deserialize, Serialize};
use std::env;

use crate::types::*;

/// Contract duration used when a project is registered without one
pub const DEFAULT_PERIOD_COUNT: u32 = 12;

/// Upper bound on schedule length, including growth from late measurements
pub const DEFAULT_MAX_PERIOD_COUNT: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub default_period_count: u32,
    pub max_period_count: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_period_count: DEFAULT_PERIOD_COUNT,
            max_period_count: DEFAULT_MAX_PERIOD_COUNT,
        }
    }
}

impl TrackerConfig {
    /// Read `PROGRESS_DEFAULT_PERIODS` and `PROGRESS_MAX_PERIODS`, loading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> TrackerResult<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            default_period_count: read_var(
                "PROGRESS_DEFAULT_PERIODS",
                defaults.default_period_count,
            )?,
            max_period_count: read_var("PROGRESS_MAX_PERIODS", defaults.max_period_count)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.default_period_count == 0 {
            return Err(TrackerError::Validation(
                "Default period count must be at least 1".to_string(),
            ));
        }
        if self.default_period_count > self.max_period_count {
            return Err(TrackerError::Validation(format!(
                "Default period count {} exceeds the maximum of {}",
                self.default_period_count, self.max_period_count
            )));
        }
        Ok(())
    }

    /// Reject schedule lengths outside `1..=max_period_count`
    pub fn check_period_count(&self, period_count: u32) -> TrackerResult<()> {
        if period_count == 0 || period_count > self.max_period_count {
            return Err(TrackerError::Validation(format!(
                "Period count must be between 1 and {}, got {}",
                self.max_period_count, period_count
            )));
        }
        Ok(())
    }
}

fn read_var(name: &str, default: u32) -> TrackerResult<u32> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            TrackerError::Validation(format!("{} must be a positive number, got '{}'", name, value))
        }),
        Err(_) => Ok(default),
    }
}
