//! Engine configuration loaded from the environment.
//!
//! Every setting has a default, so an empty environment yields
//! [`EngineConfig::default`]. A `.env` file in the working directory is
//! honoured by [`EngineConfig::from_env`].

use crate::warehouse::domain::is_valid_prefix;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable holding the task code prefix.
pub const CODE_PREFIX_VAR: &str = "WAREHOUSE_TASK_CODE_PREFIX";
/// Environment variable holding the number of code generation attempts.
pub const CODE_ATTEMPTS_VAR: &str = "WAREHOUSE_TASK_CODE_ATTEMPTS";
/// Environment variable holding the default listing page size.
pub const DEFAULT_PAGE_LIMIT_VAR: &str = "WAREHOUSE_TASK_DEFAULT_PAGE_LIMIT";
/// Environment variable holding the largest accepted listing page size.
pub const MAX_PAGE_LIMIT_VAR: &str = "WAREHOUSE_TASK_MAX_PAGE_LIMIT";

/// Tunables of the lifecycle and query services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix of generated task codes.
    pub code_prefix: String,
    /// How many fresh codes are tried before task creation gives up.
    pub code_generation_attempts: u32,
    /// Page size used when callers do not ask for one.
    pub default_page_limit: u32,
    /// Largest accepted page size.
    pub max_page_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            code_prefix: "WT".to_owned(),
            code_generation_attempts: 5,
            default_page_limit: 20,
            max_page_limit: 100,
        }
    }
}

/// Errors raised while reading configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The code prefix is empty or not uppercase alphanumeric.
    #[error("invalid task code prefix '{0}', expected uppercase letters and digits")]
    InvalidPrefix(String),

    /// A count that must be positive was zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// The default page size exceeds the maximum.
    #[error("default page limit {default} exceeds maximum page limit {max}")]
    PageLimitOrder {
        /// Configured default page size.
        default: u32,
        /// Configured maximum page size.
        max: u32,
    },
}

impl EngineConfig {
    /// Loads `.env` when present and reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a set variable is malformed or the
    /// resulting configuration is inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a set variable is malformed or the
    /// resulting configuration is inconsistent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            code_prefix: lookup(CODE_PREFIX_VAR)
                .map(|raw| raw.trim().to_owned())
                .unwrap_or(defaults.code_prefix),
            code_generation_attempts: parse_var(
                &lookup,
                CODE_ATTEMPTS_VAR,
                defaults.code_generation_attempts,
            )?,
            default_page_limit: parse_var(
                &lookup,
                DEFAULT_PAGE_LIMIT_VAR,
                defaults.default_page_limit,
            )?,
            max_page_limit: parse_var(&lookup, MAX_PAGE_LIMIT_VAR, defaults.max_page_limit)?,
        };
        config.validate()
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first violated rule.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !is_valid_prefix(&self.code_prefix) {
            return Err(ConfigError::InvalidPrefix(self.code_prefix));
        }
        if self.code_generation_attempts == 0 {
            return Err(ConfigError::Zero(CODE_ATTEMPTS_VAR));
        }
        if self.default_page_limit == 0 {
            return Err(ConfigError::Zero(DEFAULT_PAGE_LIMIT_VAR));
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(ConfigError::PageLimitOrder {
                default: self.default_page_limit,
                max: self.max_page_limit,
            });
        }
        Ok(self)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        })
}
