//! Facade configuration.
//!
//! Configuration is loaded from environment variables or a JSON document,
//! with defaults for everything.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable selecting the [`LinkSourcePolicy`].
pub const ENV_LINK_SOURCE: &str = "IDM_LINK_SOURCE";

/// Environment variable enabling or disabling audit events.
pub const ENV_AUDIT_EVENTS: &str = "IDM_AUDIT_EVENTS";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// A JSON document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How account-linking operations obtain the source entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSourcePolicy {
    /// Resolve the entry identifier through the identity store first.
    #[default]
    ResolveFirst,

    /// Use whatever is cached, without resolving.
    ///
    /// If nothing has been resolved yet the link store receives no source
    /// identifier.
    CachedOnly,
}

impl LinkSourcePolicy {
    /// Parses the policy name used in configuration.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "resolve_first" | "resolve-first" => Some(Self::ResolveFirst),
            "cached_only" | "cached-only" => Some(Self::CachedOnly),
            _ => None,
        }
    }

    /// Returns the configuration name of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveFirst => "resolve_first",
            Self::CachedOnly => "cached_only",
        }
    }
}

/// Configuration of a privileged-user facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Source-identifier policy for account linking.
    pub link_source: LinkSourcePolicy,
    /// Whether mutating operations emit audit events.
    pub audit_events: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            link_source: LinkSourcePolicy::ResolveFirst,
            audit_events: true,
        }
    }
}

impl FacadeConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set to an
    /// unrecognised value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key lookup (environment, map, ...).
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a value is unrecognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let link_source = match lookup(ENV_LINK_SOURCE) {
            Some(value) => {
                LinkSourcePolicy::parse(&value).ok_or(ConfigError::InvalidValue {
                    key: ENV_LINK_SOURCE,
                    value,
                })?
            }
            None => defaults.link_source,
        };

        let audit_events = match lookup(ENV_AUDIT_EVENTS) {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_AUDIT_EVENTS,
                        value,
                    })
                }
            },
            None => defaults.audit_events,
        };

        Ok(Self {
            link_source,
            audit_events,
        })
    }

    /// Parses configuration from a JSON document. Missing fields take
    /// their defaults.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::Parse` if the document is malformed.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            link_source: LinkSourcePolicy::ResolveFirst,
            audit_events: true,
        }
    }

    /// Sets the link source policy.
    #[must_use]
    pub const fn with_link_source(mut self, policy: LinkSourcePolicy) -> Self {
        self.link_source = policy;
        self
    }

    /// Enables or disables audit events.
    #[must_use]
    pub const fn with_audit_events(mut self, enabled: bool) -> Self {
        self.audit_events = enabled;
        self
    }
}
