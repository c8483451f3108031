//! reqwest implementation of [`CatalogClient`].

use super::{
    Album, Artist, CatalogClient, CatalogResult, Page, Playlist, PlaylistItem, SearchResults,
    StreamUrl, Track, VideoStreamUrl,
};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Error, Result};
use crate::session::Session;
use crate::types::QualityTier;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Catalog sub-status for "resource exists but not in this region"
const SUB_STATUS_REGION_LOCKED: u32 = 2001;

/// Catalog sub-status for "asset is not ready for playback"
const SUB_STATUS_ASSET_NOT_READY: u32 = 4005;

/// Error body returned by the catalog
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    sub_status: Option<u32>,
    #[serde(default)]
    user_message: Option<String>,
}

/// Production catalog client
#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl HttpCatalogClient {
    /// Build a client from configuration
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid catalog base URL: {e}"),
            key: Some("catalog.base_url".to_string()),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: "catalog base URL cannot carry a path".to_string(),
                key: Some("catalog.base_url".to_string()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            client,
            base_url,
            page_size: config.page_size.max(1),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET one record; `resource`/`id` name the record in classified errors
    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        resource: &str,
        id: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> CatalogResult<T> {
        let url = self.endpoint(segments);
        tracing::debug!(url = %url, region = %session.country_code, "Catalog request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&session.access_token)
            .query(&[("countryCode", session.country_code.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        Err(classify_error(status.as_u16(), &body, resource, id))
    }

    /// GET every page of a listing and concatenate the items in order
    async fn get_all_items<T: DeserializeOwned>(
        &self,
        session: &Session,
        resource: &str,
        id: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> CatalogResult<Page<T>> {
        let mut items = Vec::new();
        let mut total = 0;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("limit", self.page_size.to_string()));
            page_query.push(("offset", items.len().to_string()));

            let page: Page<T> = self
                .get(session, resource, id, segments, &page_query)
                .await?;
            total = total.max(page.total_number_of_items);
            let received = page.items.len();
            items.extend(page.items);

            if received == 0 || items.len() >= total {
                break;
            }
        }

        Ok(Page {
            total_number_of_items: total.max(items.len()),
            items,
        })
    }
}

/// Map a failed response to a [`CatalogError`] using the body's status fields
fn classify_error(http_status: u16, body: &[u8], resource: &str, id: &str) -> CatalogError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let status = parsed.status.unwrap_or(http_status);
    let message = parsed
        .user_message
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    match (status, parsed.sub_status) {
        (404, Some(SUB_STATUS_REGION_LOCKED)) => CatalogError::RegionLocked {
            resource: resource.to_string(),
            id: id.to_string(),
        },
        (404, _) | (_, Some(SUB_STATUS_ASSET_NOT_READY)) => CatalogError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        },
        (401 | 403, _) => CatalogError::Unauthorized(message),
        _ => CatalogError::Http { status, message },
    }
}

#[async_trait::async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_track(&self, session: &Session, id: &str) -> CatalogResult<Track> {
        self.get(session, "track", id, &["tracks", id], &[]).await
    }

    async fn get_playlist(&self, session: &Session, id: &str) -> CatalogResult<Playlist> {
        self.get(session, "playlist", id, &["playlists", id], &[])
            .await
    }

    async fn get_playlist_items(
        &self,
        session: &Session,
        id: &str,
    ) -> CatalogResult<Page<PlaylistItem>> {
        self.get_all_items(session, "playlist", id, &["playlists", id, "items"], &[])
            .await
    }

    async fn get_album(&self, session: &Session, id: &str) -> CatalogResult<Album> {
        self.get(session, "album", id, &["albums", id], &[]).await
    }

    async fn get_album_tracks(&self, session: &Session, id: &str) -> CatalogResult<Page<Track>> {
        self.get_all_items(session, "album", id, &["albums", id, "tracks"], &[])
            .await
    }

    async fn get_artist(&self, session: &Session, id: &str) -> CatalogResult<Artist> {
        self.get(session, "artist", id, &["artists", id], &[]).await
    }

    async fn get_artist_albums(&self, session: &Session, id: &str) -> CatalogResult<Page<Album>> {
        self.get_all_items(session, "artist", id, &["artists", id, "albums"], &[])
            .await
    }

    async fn get_artist_albums_eps_singles(
        &self,
        session: &Session,
        id: &str,
    ) -> CatalogResult<Page<Album>> {
        self.get_all_items(
            session,
            "artist",
            id,
            &["artists", id, "albums"],
            &[("filter", "EPSANDSINGLES".to_string())],
        )
        .await
    }

    async fn get_video(&self, session: &Session, id: &str) -> CatalogResult<Track> {
        let mut video: Track = self.get(session, "video", id, &["videos", id], &[]).await?;
        if video.media_type.is_none() {
            video.media_type = Some("Music Video".to_string());
        }
        Ok(video)
    }

    async fn search(
        &self,
        session: &Session,
        query: &str,
        limit: usize,
    ) -> CatalogResult<SearchResults> {
        self.get(
            session,
            "search",
            query,
            &["search"],
            &[
                ("query", query.to_string()),
                ("types", "ARTISTS,ALBUMS,TRACKS".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn stream_url(
        &self,
        session: &Session,
        track_id: u64,
        quality: QualityTier,
    ) -> CatalogResult<StreamUrl> {
        let id = track_id.to_string();
        self.get(
            session,
            "stream",
            &id,
            &["tracks", &id, "streamUrl"],
            &[("soundQuality", quality.as_api_str().to_string())],
        )
        .await
    }

    async fn video_stream_url(
        &self,
        session: &Session,
        video_id: u64,
    ) -> CatalogResult<VideoStreamUrl> {
        let id = video_id.to_string();
        self.get(
            session,
            "video stream",
            &id,
            &["videos", &id, "streamUrl"],
            &[("videoQuality", "HIGH".to_string())],
        )
        .await
    }
}
