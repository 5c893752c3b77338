//! Ops Manager API error types.

use thiserror::Error;

/// Errors returned by group API calls. None of them are retried.
#[derive(Debug, Error)]
pub enum GroupApiError {
    #[error("invalid Ops Manager url: {0}")]
    InvalidUrl(String),

    #[error("invalid group id: {0:?}")]
    InvalidGroupId(String),

    #[error("digest authentication failed: {0}")]
    Auth(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

pub type GroupApiResult<T> = Result<T, GroupApiError>;
