//! Import configuration.
//!
//! Controls how the importer treats usergroups whose membership is both
//! listed and criteria-based, banned users, and role failures. Configuration
//! is loaded from environment variables with defaults that follow the
//! interchange conventions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Membership resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Keep explicitly listed users of usergroups that also carry criteria.
    ///
    /// Off by default: a group with criteria is assumed to be fully
    /// described by them.
    #[serde(default)]
    pub honor_explicit_users: bool,

    /// Reject usergroups that list users alongside criteria.
    #[serde(default)]
    pub strict_membership: bool,

    /// Fail the whole batch when any usergroup fails.
    #[serde(default)]
    pub abort_on_role_error: bool,

    /// Leave banned users out of implicit and registered membership.
    #[serde(default)]
    pub skip_banned_users: bool,
}

/// Environment variable for [`ImportConfig::honor_explicit_users`].
pub const ENV_HONOR_EXPLICIT_USERS: &str = "FORUM_IMPORT_HONOR_EXPLICIT_USERS";
/// Environment variable for [`ImportConfig::strict_membership`].
pub const ENV_STRICT_MEMBERSHIP: &str = "FORUM_IMPORT_STRICT_MEMBERSHIP";
/// Environment variable for [`ImportConfig::abort_on_role_error`].
pub const ENV_ABORT_ON_ROLE_ERROR: &str = "FORUM_IMPORT_ABORT_ON_ROLE_ERROR";
/// Environment variable for [`ImportConfig::skip_banned_users`].
pub const ENV_SKIP_BANNED_USERS: &str = "FORUM_IMPORT_SKIP_BANNED_USERS";

impl ImportConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FORUM_IMPORT_HONOR_EXPLICIT_USERS` (default: false)
    /// - `FORUM_IMPORT_STRICT_MEMBERSHIP` (default: false)
    /// - `FORUM_IMPORT_ABORT_ON_ROLE_ERROR` (default: false)
    /// - `FORUM_IMPORT_SKIP_BANNED_USERS` (default: false)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from environment variables, rejecting bad values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, fallback: bool| {
            lookup(key)
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(fallback)
        };

        Self {
            honor_explicit_users: flag(ENV_HONOR_EXPLICIT_USERS, default.honor_explicit_users),
            strict_membership: flag(ENV_STRICT_MEMBERSHIP, default.strict_membership),
            abort_on_role_error: flag(ENV_ABORT_ON_ROLE_ERROR, default.abort_on_role_error),
            skip_banned_users: flag(ENV_SKIP_BANNED_USERS, default.skip_banned_users),
        }
    }

    /// Load configuration through a variable lookup, rejecting bad values.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, fallback: bool| -> Result<bool, ConfigError> {
            match lookup(key) {
                None => Ok(fallback),
                Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("expected true/false/1/0, got {:?}", raw),
                }),
            }
        };

        let config = Self {
            honor_explicit_users: flag(ENV_HONOR_EXPLICIT_USERS, default.honor_explicit_users)?,
            strict_membership: flag(ENV_STRICT_MEMBERSHIP, default.strict_membership)?,
            abort_on_role_error: flag(ENV_ABORT_ON_ROLE_ERROR, default.abort_on_role_error)?,
            skip_banned_users: flag(ENV_SKIP_BANNED_USERS, default.skip_banned_users)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.honor_explicit_users && self.strict_membership {
            return Err(ConfigError::InvalidValue {
                key: ENV_HONOR_EXPLICIT_USERS.to_string(),
                message: "cannot honor explicit users while strict membership rejects them"
                    .to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
