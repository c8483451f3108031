//! # tidal-relay
//!
//! Resolves catalog identifiers (tracks, albums, artists, playlists, videos and
//! lists of track ids) into downloadable items and downloads them, retrying
//! region-locked content through a pool of regional sessions.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - The REST API is a thin layer over [`MediaDownloader`]
//! - **Region-aware** - Region locks rotate sessions; other errors never do
//! - **Idempotent** - Artifacts already on disk count as done
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use tidal_relay::{Config, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = downloader
//!         .download_identifier("https://tidal.com/browse/album/1234")
//!         .await?;
//!     println!("saved to {}", report.directory());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Remote catalog client and records
pub mod catalog;
/// Configuration types
pub mod config;
/// Identifier resolution, orchestration and the downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// Identifier parsing and kind classification
pub mod identifier;
/// Expansion of identifiers into track lists
pub mod resolver;
/// Retry classification and region failover
pub mod retry;
/// Search result ranking
pub mod search;
/// Sessions and the regional rotator
pub mod session;
/// Core types and events
pub mod types;
/// Naming and on-disk artifact helpers
pub mod utils;

// Re-export commonly used types
pub use catalog::{CatalogClient, HttpCatalogClient};
pub use config::{ApiConfig, Config, Preset};
pub use downloader::{
    DownloadBackend, DownloadOrchestrator, HttpDownloadBackend, MediaDownloader, MediaRequest,
    OrchestrationReport,
};
pub use error::{
    ApiError, CatalogError, DownloadError, Error, ErrorDetail, Result, ToHttpStatus,
};
pub use identifier::Identifier;
pub use resolver::{FilterPipeline, MediaResolver, ResolvedMedia};
pub use retry::{FailoverError, IsRetryable, RegionFailover};
pub use search::{SearchKind, SearchResponse};
pub use session::{JsonSessionStore, Session, SessionRotator, SessionStore};
pub use types::{BatchReport, EntryOutcome, EntryReport, Event, MediaKind, QualityTier, ResolvedItem};
