//! # Configuration
//!
//! TOML-backed settings, loaded from `adscope.toml` unless `--config` names
//! another file. Secrets may stay in the environment:
//!
//! - `ADSCOPE_URL` overrides `service.base_url`
//! - `ADSCOPE_API_KEY` overrides `service.api_key`
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:3004"
//! api_key = "..."
//! timeout_secs = 30
//!
//! [calendar]
//! week_start = "monday"
//! ```

use adscope_core::{AdscopeError, DateRangeResolver, WeekStart};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// File read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "adscope.toml";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3004";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdscopeConfig {
    pub service: ServiceConfig,
    pub calendar: CalendarConfig,
}

/// Where the analytics service lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Bearer token, if the service requires one.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    pub week_start: WeekStart,
}

// =============================================================================
// LOADING
// =============================================================================

impl AdscopeConfig {
    /// Parse a TOML document. Absent keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, AdscopeError> {
        toml::from_str(content).map_err(|e| AdscopeError::ConfigError(e.to_string()))
    }

    /// Load the explicit file, or the default file if it exists.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, AdscopeError> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, AdscopeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdscopeError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            AdscopeError::ConfigError(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply `ADSCOPE_URL` and `ADSCOPE_API_KEY` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("ADSCOPE_URL").ok(),
            std::env::var("ADSCOPE_API_KEY").ok(),
        )
    }

    /// Replace the service URL and key where a non-empty value is given.
    pub fn with_overrides(mut self, base_url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|v| !v.is_empty()) {
            self.service.base_url = url;
        }
        if let Some(key) = api_key.filter(|v| !v.is_empty()) {
            self.service.api_key = Some(key);
        }
        self
    }

    pub fn resolver(&self) -> DateRangeResolver {
        DateRangeResolver::new(self.calendar.week_start)
    }
}

// =============================================================================
// TESTS
// =============================================================================
