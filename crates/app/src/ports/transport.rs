//! Transport port — asynchronous one-shot GET against a status resource.
//!
//! The scheduler never talks to an HTTP client directly. It asks the
//! [`Transport`] for a fresh request handle on every tick; a transport that
//! cannot provide one (no usable HTTP client on this host) makes the
//! scheduler back off and try again later.

use std::future::Future;
use std::sync::Arc;

use statuspoll_domain::error::FetchError;

/// Factory for request handles.
pub trait Transport: Send + Sync + 'static {
    /// Handle type produced by [`create_request`](Self::create_request).
    type Request: HttpRequest;

    /// Create a handle able to perform one GET.
    ///
    /// Returns `None` when the platform offers no usable HTTP client.
    fn create_request(&self) -> Option<Self::Request>;
}

impl<T: Transport> Transport for Arc<T> {
    type Request = T::Request;

    fn create_request(&self) -> Option<Self::Request> {
        (**self).create_request()
    }
}

/// A single asynchronous GET.
///
/// `get` consumes the handle, so the returned future resolves exactly once.
/// Retry policy belongs to the scheduler, never to the request.
pub trait HttpRequest: Send + 'static {
    /// Fetch `url`.
    ///
    /// Resolves with the response body when the request completed with a
    /// success status.
    ///
    /// # Errors
    ///
    /// Resolves with [`FetchError::Status`] for non-success statuses and
    /// [`FetchError::Transport`] when the request could not complete.
    fn get(self, url: String) -> impl Future<Output = Result<String, FetchError>> + Send + 'static;
}
