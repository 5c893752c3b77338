//! Configuration error types.

use thiserror::Error;

/// Errors caused by malformed operator-authored or caller-supplied input.
///
/// These are always fatal for a generation call and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("no definition found for instance group '{0}'")]
    MissingInstanceGroup(String),

    #[error("no networks definition found for instance group '{0}'")]
    NoNetworks(String),

    #[error("missing plan property: {0}")]
    MissingPlanProperty(String),

    #[error("invalid plan property '{field}': {reason}")]
    InvalidPlanProperty { field: String, reason: String },

    #[error("invalid request parameter '{name}': expected {expected}")]
    InvalidParameter { name: String, expected: &'static str },

    #[error("previous manifest is missing or has a malformed '{field}'")]
    MalformedPreviousManifest { field: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
