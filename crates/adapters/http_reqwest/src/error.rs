//! HTTP adapter error types.

use statuspoll_domain::error::FetchError;

/// Errors specific to the reqwest transport.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The HTTP client could not be constructed on this host.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Sending the request or reading the body failed.
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("device answered with HTTP status {0}")]
    Status(u16),
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status(code) => FetchError::Status(code),
            other => FetchError::Transport(Box::new(other)),
        }
    }
}
