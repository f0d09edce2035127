//! Configuration loading for the recovery engine
//!
//! Defaults, then an optional TOML file (`FETCHGUARD_CONFIG`), then
//! `FETCHGUARD_*` environment overrides. Profiles convert into validated
//! `RetryConfig` values; invalid settings fail loading, they are never
//! clamped.

use fetchguard_core::error::ConfigError;
use fetchguard_core::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    pub logging: LoggingSettings,
    pub profiles: HashMap<String, RetryProfileSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// One named retry profile, in wire-friendly integer units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryProfileSettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub exponential_base: f64,
    pub failure_threshold: u32,
    pub recovery_timeout_secs: u64,
    pub window_size: usize,
    pub success_threshold: f64,
}

impl Default for RetryProfileSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
            jitter: true,
            exponential_base: 2.0,
            failure_threshold: 5,
            recovery_timeout_secs: 60,
            window_size: 20,
            success_threshold: 0.5,
        }
    }
}

impl RetryProfileSettings {
    /// Convert into a validated `RetryConfig`.
    pub fn to_config(&self) -> Result<RetryConfig, ConfigError> {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter: self.jitter,
            exponential_base: self.exponential_base,
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
            window_size: self.window_size,
            success_threshold: self.success_threshold,
        }
        .validated()
    }
}

impl Default for RecoverySettings {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "network".to_string(),
            RetryProfileSettings {
                max_attempts: 5,
                base_delay_ms: 250,
                max_delay_ms: 30_000,
                ..Default::default()
            },
        );
        profiles.insert(
            "quota".to_string(),
            RetryProfileSettings {
                max_attempts: 4,
                base_delay_ms: 1_000,
                max_delay_ms: 120_000,
                exponential_base: 3.0,
                ..Default::default()
            },
        );
        profiles.insert(
            "download".to_string(),
            RetryProfileSettings {
                max_attempts: 3,
                base_delay_ms: 500,
                max_delay_ms: 60_000,
                ..Default::default()
            },
        );
        Self {
            logging: LoggingSettings::default(),
            profiles,
        }
    }
}

impl RecoverySettings {
    /// Load settings: defaults, then the file named by `FETCHGUARD_CONFIG`
    /// if set, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match env::var("FETCHGUARD_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        settings.load_from_env()?;
        Ok(settings)
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::file_not_found(path))?;
        toml::from_str(&raw).map_err(|e| ConfigError::parse_error(e.to_string()))
    }

    /// Apply `FETCHGUARD_*` overrides. These are global: they adjust every
    /// profile, matching how operators tune a whole deployment at once.
    fn load_from_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = env::var("FETCHGUARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = env::var("FETCHGUARD_MAX_ATTEMPTS") {
            let max_attempts = value
                .parse()
                .map_err(|_| ConfigError::invalid_field("max_attempts", "expected an integer"))?;
            for profile in self.profiles.values_mut() {
                profile.max_attempts = max_attempts;
            }
        }
        if let Ok(value) = env::var("FETCHGUARD_BASE_DELAY_MS") {
            let base_delay_ms = value
                .parse()
                .map_err(|_| ConfigError::invalid_field("base_delay_ms", "expected an integer"))?;
            for profile in self.profiles.values_mut() {
                profile.base_delay_ms = base_delay_ms;
            }
        }
        if let Ok(value) = env::var("FETCHGUARD_JITTER") {
            let jitter = value
                .parse()
                .map_err(|_| ConfigError::invalid_field("jitter", "expected true or false"))?;
            for profile in self.profiles.values_mut() {
                profile.jitter = jitter;
            }
        }
        Ok(())
    }

    /// The named profile as a validated `RetryConfig`.
    pub fn profile(&self, name: &str) -> Result<RetryConfig, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::missing_field(format!("profiles.{name}")))?
            .to_config()
    }
}

/// Install the global tracing subscriber from logging settings. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.clone()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
