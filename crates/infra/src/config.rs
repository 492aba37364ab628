//! Configuration loading and representation.

use std::time::Duration;

use thiserror::Error;

use projector_core::Context;

/// Default per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

const TIMEOUT_VAR: &str = "PROJECTOR_DEFAULT_TIMEOUT_MS";
const LOG_VAR: &str = "PROJECTOR_LOG";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process-level engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline applied to contexts created by [`EngineConfig::context`].
    /// `None` disables the deadline (`PROJECTOR_DEFAULT_TIMEOUT_MS=0`).
    pub default_timeout: Option<Duration>,
    /// `tracing` filter directive, e.g. `"info"` or `"projector_infra=debug"`.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (environment, file, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                var: TIMEOUT_VAR,
                reason: format!("{raw:?}: {e}"),
            })?;
            config.default_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        if let Some(filter) = lookup(LOG_VAR) {
            let filter = filter.trim();
            if filter.is_empty() {
                return Err(ConfigError::Invalid {
                    var: LOG_VAR,
                    reason: "must not be empty".to_string(),
                });
            }
            config.log_filter = filter.to_string();
        }

        Ok(config)
    }

    /// A fresh request context carrying the configured deadline.
    pub fn context(&self) -> Context {
        match self.default_timeout {
            Some(timeout) => Context::with_timeout(timeout),
            None => Context::background(),
        }
    }
}
