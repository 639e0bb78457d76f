//! # statuspoll-adapter-http-reqwest
//!
//! HTTP transport for the poll scheduler, backed by a shared
//! [`reqwest::Client`].
//!
//! ## How it works
//!
//! The client is built lazily on the first
//! [`create_request`](Transport::create_request). If construction fails
//! (e.g. the TLS backend cannot initialise) no request handle is returned and
//! the scheduler backs off; the next call tries again. Once built, the client
//! is cloned into every request handle, sharing its connection pool.
//!
//! A request resolves with the body only for `2xx` answers. Every other
//! outcome maps to a [`FetchError`]. There are no retries here.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `statuspoll-app` and
//! `statuspoll-domain`.

mod config;
mod error;

pub use config::HttpConfig;
pub use error::HttpError;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use statuspoll_app::ports::{HttpRequest, Transport};
use statuspoll_domain::error::FetchError;

/// [`Transport`] implementation using reqwest.
#[derive(Debug)]
pub struct ReqwestTransport {
    config: HttpConfig,
    client: Mutex<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    /// Create a transport. The client itself is built on first use.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, HttpError> {
        reqwest::Client::builder()
            .timeout(self.config.timeout())
            .user_agent(self.config.user_agent.as_str())
            .build()
            .map_err(HttpError::ClientBuild)
    }
}

impl Transport for ReqwestTransport {
    type Request = ReqwestRequest;

    fn create_request(&self) -> Option<ReqwestRequest> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Some(ReqwestRequest {
                client: client.clone(),
            });
        }
        match self.build_client() {
            Ok(client) => {
                tracing::debug!(timeout_ms = self.config.timeout_ms, "HTTP client ready");
                *slot = Some(client.clone());
                Some(ReqwestRequest { client })
            }
            Err(err) => {
                tracing::warn!(error = %err, "HTTP client unavailable");
                None
            }
        }
    }
}

/// One-shot GET handle.
#[derive(Debug)]
pub struct ReqwestRequest {
    client: reqwest::Client,
}

impl ReqwestRequest {
    async fn fetch(&self, url: &str) -> Result<String, HttpError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

impl HttpRequest for ReqwestRequest {
    fn get(self, url: String) -> impl Future<Output = Result<String, FetchError>> + Send + 'static {
        async move { self.fetch(&url).await.map_err(FetchError::from) }
    }
}
