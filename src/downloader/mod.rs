//! Media downloader facade and the pipeline behind it.
//!
//! The `MediaDownloader` struct and its methods are organized by concern:
//! - [`backend`] - the [`DownloadBackend`] seam and its HTTP implementation
//! - [`orchestrator`] - sequential per-item download with region failover
//! - [`batch`] - classify, resolve and download identifiers
//! - [`lookup`] - classification and search entry points

pub mod backend;
mod batch;
mod lookup;
pub mod orchestrator;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use backend::{DownloadBackend, DownloadJob, DownloadOutcome, HttpDownloadBackend};
pub use batch::MediaRequest;
pub use orchestrator::{DownloadOrchestrator, OrchestrationReport};

use crate::catalog::{CatalogClient, HttpCatalogClient};
use crate::config::Config;
use crate::error::Result;
use crate::resolver::{FilterPipeline, MediaResolver};
use crate::session::{JsonSessionStore, SessionStore};
use crate::types::Event;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Source of the default session and the regional pool
    pub(crate) sessions: Arc<dyn SessionStore>,
    /// Catalog used for classification and resolution
    pub(crate) catalog: Arc<dyn CatalogClient>,
    /// Backend that writes artifacts
    pub(crate) backend: Arc<dyn DownloadBackend>,
}

impl MediaDownloader {
    /// Create a new MediaDownloader with HTTP collaborators
    ///
    /// This validates the configuration and initializes:
    /// - the JSON session store at `sessions.path`
    /// - the HTTP catalog client
    /// - the HTTP download backend using the configured quality preset
    /// - the event broadcast channel
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                crate::error::Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let sessions: Arc<dyn SessionStore> = Arc::new(JsonSessionStore::new(&config.sessions.path));
        let catalog: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new(&config.catalog)?);
        let backend: Arc<dyn DownloadBackend> = Arc::new(HttpDownloadBackend::new(
            catalog.clone(),
            config.quality_preset(),
            config.catalog.timeout,
        )?);

        tracing::info!(
            download_dir = %config.download.download_dir.display(),
            sessions = %config.sessions.path.display(),
            region_failover = config.download.region_failover,
            "Media downloader initialized"
        );

        Ok(Self::with_components(config, sessions, catalog, backend))
    }

    /// Create a MediaDownloader from explicit collaborators
    pub fn with_components(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<dyn CatalogClient>,
        backend: Arc<dyn DownloadBackend>,
    ) -> Self {
        // Buffer of 1000 events; slow subscribers see RecvError::Lagged
        let (event_tx, _rx) = broadcast::channel(1000);
        Self {
            event_tx,
            config: Arc::new(config),
            sessions,
            catalog,
            backend,
        }
    }

    /// Subscribe to resolution and download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidal_relay::{Config, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "download event");
    ///         }
    ///     });
    ///
    ///     let report = downloader.download_identifier("1234567").await?;
    ///     println!("{}", report.directory());
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers; dropped when nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn resolver(&self) -> MediaResolver {
        MediaResolver::new(self.catalog.clone(), FilterPipeline::from(&self.config.preset))
            .with_events(self.event_tx.clone())
    }

    pub(crate) fn orchestrator(&self) -> DownloadOrchestrator {
        DownloadOrchestrator::new(self.backend.clone()).with_events(self.event_tx.clone())
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
