// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the ticker computes the delta time it hands to `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Always report the nominal interval.
    Fixed,
    /// Report the measured time since the previous tick, clamped to `max_delta_ms`.
    #[default]
    Variable,
}

/// Timing settings of the built-in ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TickerConfig {
    /// The period between two ticks, in milliseconds.
    pub interval_ms: u64,
    /// The delta time policy.
    pub mode: TickMode,
    /// Upper bound of a variable delta time, in milliseconds.
    pub max_delta_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            mode: TickMode::Variable,
            max_delta_ms: 250,
        }
    }
}

impl TickerConfig {
    /// The tick period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The largest delta time a variable ticker reports.
    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }

    /// Checks that the timings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "ticker.intervalMs must be greater than zero".to_string(),
            ));
        }
        if self.max_delta_ms < self.interval_ms {
            return Err(ConfigError::Invalid(format!(
                "ticker.maxDeltaMs ({}) must not be below ticker.intervalMs ({})",
                self.max_delta_ms, self.interval_ms
            )));
        }
        Ok(())
    }
}

/// Top-level application settings.
///
/// ```rust
/// use lumen_sdk::AppConfig;
///
/// let config = AppConfig::from_json_str(r#"{ "useTicker": true }"#).unwrap();
/// assert!(config.use_ticker);
/// assert_eq!(config.ticker.interval_ms, 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Registers the built-in ticker script at construction.
    pub use_ticker: bool,
    /// Ticker timings, ignored unless `use_ticker` is set.
    pub ticker: TickerConfig,
}

impl AppConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded configuration from {}.", path.display());
        Self::from_json_str(&json)
    }

    /// Checks every section of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_ticker {
            self.ticker.validate()?;
        }
        Ok(())
    }
}
