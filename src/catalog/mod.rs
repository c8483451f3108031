//! Remote catalog access.
//!
//! - [`CatalogClient`] - the lookups the resolver and backend need, one session per call
//! - [`HttpCatalogClient`] - production implementation over the catalog's REST API
//! - [`models`] - wire records

mod http;
pub mod models;

pub use http::HttpCatalogClient;
pub use models::{
    Album, AlbumRef, Artist, ArtistRef, Creator, Page, Playlist, PlaylistItem, SearchResults,
    StreamUrl, Track, VideoStreamUrl,
};

use crate::error::CatalogError;
use crate::session::Session;
use crate::types::QualityTier;

/// Result of a catalog call
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Catalog lookups performed on behalf of a given session.
///
/// Implementations classify failures into [`CatalogError`] variants; in particular
/// a resource hidden from the session's region must surface as
/// [`CatalogError::RegionLocked`], never as a generic HTTP error.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch a track
    async fn get_track(&self, session: &Session, id: &str) -> CatalogResult<Track>;

    /// Fetch playlist metadata
    async fn get_playlist(&self, session: &Session, id: &str) -> CatalogResult<Playlist>;

    /// Fetch every playlist entry in stored order
    async fn get_playlist_items(
        &self,
        session: &Session,
        id: &str,
    ) -> CatalogResult<Page<PlaylistItem>>;

    /// Fetch album metadata
    async fn get_album(&self, session: &Session, id: &str) -> CatalogResult<Album>;

    /// Fetch every track of an album in catalog order
    async fn get_album_tracks(&self, session: &Session, id: &str) -> CatalogResult<Page<Track>>;

    /// Fetch artist metadata
    async fn get_artist(&self, session: &Session, id: &str) -> CatalogResult<Artist>;

    /// Fetch the artist's full-length albums
    async fn get_artist_albums(&self, session: &Session, id: &str) -> CatalogResult<Page<Album>>;

    /// Fetch the artist's EPs and singles
    async fn get_artist_albums_eps_singles(
        &self,
        session: &Session,
        id: &str,
    ) -> CatalogResult<Page<Album>>;

    /// Fetch a music video
    async fn get_video(&self, session: &Session, id: &str) -> CatalogResult<Track>;

    /// Free-text search over artists, albums and tracks
    async fn search(
        &self,
        session: &Session,
        query: &str,
        limit: usize,
    ) -> CatalogResult<SearchResults>;

    /// Stream location of a track at one quality tier
    async fn stream_url(
        &self,
        session: &Session,
        track_id: u64,
        quality: QualityTier,
    ) -> CatalogResult<StreamUrl>;

    /// HLS master playlist of a video
    async fn video_stream_url(
        &self,
        session: &Session,
        video_id: u64,
    ) -> CatalogResult<VideoStreamUrl>;
}
