//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`StatusPollError`] via `#[from]`; page setup in the daemon returns it.
//! Once a page is polling, failures never surface as errors: the scheduler
//! degrades every one into a retry delay and only reports it through
//! `tracing`.

/// Base error for the statuspoll workspace.
#[derive(Debug, thiserror::Error)]
pub enum StatusPollError {
    /// A value violated a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A status resource could not be fetched.
    #[error("fetch error")]
    Fetch(#[from] FetchError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Poll intervals must be strictly positive.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// Resource URLs must not be blank.
    #[error("resource url must not be empty")]
    EmptyUrl,

    /// The configured parser name does not match any known variant.
    #[error("unknown response parser {0:?}")]
    UnknownParser(String),
}

/// Why a single GET against a status resource produced no body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The device answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The request could not be sent or the body could not be read.
    #[error("transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request task ended without producing a result (panic or abort).
    #[error("request task aborted")]
    Aborted,
}
