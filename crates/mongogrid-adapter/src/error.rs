//! Manifest generation error types.

use mongogrid_core::ConfigError;
use mongogrid_opsmanager::GroupApiError;
use thiserror::Error;

/// A required job could not be bound to exactly one release.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("no release provided for job '{job}'")]
    NoReleaseForJob { job: String },

    #[error("job '{job}' defined in multiple releases: {}", .releases.join(", "))]
    AmbiguousRelease { job: String, releases: Vec<String> },
}

#[derive(Debug, Error)]
#[error("could not generate secret: {0}")]
pub struct SecretError(pub String);

/// Errors that abort a generation call. No manifest is produced.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ReleaseBinding(#[from] ReleaseError),

    #[error("could not create new group ({0})")]
    ExternalResource(#[from] GroupApiError),

    #[error(transparent)]
    SecretGeneration(#[from] SecretError),
}

pub type GenerateResult<T> = Result<T, GenerateError>;
