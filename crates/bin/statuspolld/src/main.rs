//! # statuspolld — device status poller daemon
//!
//! Composition root that wires the adapters together and starts polling.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the shared reqwest transport
//! - Build one view and one poll scheduler per configured device page
//! - Hand each scheduler its resource list, then wait for Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no polling logic belongs here.

mod config;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use statuspoll_adapter_http_reqwest::ReqwestTransport;
use statuspoll_app::scheduler::{PollScheduler, SchedulerHandle};
use statuspoll_app::view::InMemoryView;
use statuspoll_domain::error::StatusPollError;

use crate::config::{Config, PageConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    if config.pages.is_empty() {
        tracing::warn!("no pages configured, nothing to poll");
        return Ok(());
    }

    let transport = Arc::new(ReqwestTransport::new(config.http.clone()));

    let mut pages = Vec::with_capacity(config.pages.len());
    for page in &config.pages {
        pages.push(start_page(Arc::clone(&transport), page)?);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    for (_handle, task) in pages {
        task.abort();
    }
    Ok(())
}

/// Spawn the scheduler of one page and give it its resources.
///
/// A page that fails validation does not leave a scheduler behind.
fn start_page(
    transport: Arc<ReqwestTransport>,
    page: &PageConfig,
) -> Result<(SchedulerHandle, JoinHandle<()>), StatusPollError> {
    let parser = page.parser_kind()?.build();
    let view = Arc::new(InMemoryView::with_elements(
        parser.element_ids().iter().copied(),
    ));
    let parser_name = parser.name();

    let (handle, task) = PollScheduler::new(transport, view, parser).spawn();
    let urls = page.urls();
    let count = urls.len();
    let configured = page
        .interval_ms
        .map_or(Ok(()), |millis| handle.set_interval(millis))
        .and_then(|()| handle.set_resources(urls));
    if let Err(err) = configured {
        task.abort();
        return Err(err.into());
    }

    tracing::info!(page = %page.name, parser = parser_name, resources = count, "page polling started");
    Ok((handle, task))
}
