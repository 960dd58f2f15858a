//! Error types for the chaser crate.
//!
//! The control arithmetic itself never fails: every numeric path is clamped.
//! Errors only come from the edges of the system, configuration files and the
//! actuator collaborator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`ChaseConfig`](crate::config::ChaseConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML or has wrongly typed fields.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds a value the controller cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure reported by an actuator dispatcher.
///
/// The controller logs these and moves on. Retry and backoff belong to the
/// dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport to the motor driver is gone (unplugged, closed port).
    #[error("actuator link unavailable: {0}")]
    Unavailable(String),

    /// The driver rejected or failed to apply the command.
    #[error("actuator rejected command: {0}")]
    Rejected(String),
}

/// Decoding an integer motor-action code failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandCodeError {
    #[error("unknown motion command code {0}")]
    Unknown(u8),
}
