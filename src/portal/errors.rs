//! Error types for the council portal client.

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Portal session is missing or was never established: {0}")]
    InvalidSession(String),
    #[error("Invalid portal URL")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    RequestFailed(#[from] reqwest::Error),
}
