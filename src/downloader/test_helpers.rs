//! Shared in-memory collaborators and record builders for tests.

use crate::catalog::{
    Album, AlbumRef, Artist, ArtistRef, CatalogClient, CatalogResult, Creator, Page, Playlist,
    PlaylistItem, SearchResults, StreamUrl, Track, VideoStreamUrl,
};
use crate::downloader::backend::{DownloadBackend, DownloadJob, DownloadOutcome};
use crate::error::{CatalogError, DownloadError};
use crate::session::{Session, SessionStore};
use crate::types::QualityTier;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One recorded catalog call
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CatalogCall {
    pub(crate) method: &'static str,
    pub(crate) session: String,
    pub(crate) id: String,
}

#[derive(Default)]
struct CatalogState {
    tracks: HashMap<String, Track>,
    videos: HashMap<String, Track>,
    albums: HashMap<String, (Album, Vec<Track>)>,
    artists: HashMap<String, (Artist, Vec<Album>, Vec<Album>)>,
    playlists: HashMap<String, (Playlist, Vec<PlaylistItem>)>,
    streams: HashMap<(u64, QualityTier), StreamUrl>,
    video_streams: HashMap<u64, String>,
    search: SearchResults,
    /// id -> session names allowed to see it
    region_locks: HashMap<String, HashSet<String>>,
    unauthorized: HashSet<String>,
    calls: Vec<CatalogCall>,
}

/// In-memory catalog with per-session region locks and call recording
#[derive(Default)]
pub(crate) struct MockCatalog {
    state: Mutex<CatalogState>,
}

impl MockCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_track(&self, track: Track) {
        let mut state = self.state.lock().unwrap();
        state.tracks.insert(track.id.to_string(), track);
    }

    pub(crate) fn add_video(&self, mut video: Track) {
        video.media_type.get_or_insert_with(|| "Music Video".to_string());
        let mut state = self.state.lock().unwrap();
        state.videos.insert(video.id.to_string(), video);
    }

    pub(crate) fn add_album(&self, album: Album, tracks: Vec<Track>) {
        let mut state = self.state.lock().unwrap();
        for track in &tracks {
            state.tracks.insert(track.id.to_string(), track.clone());
        }
        state.albums.insert(album.id.to_string(), (album, tracks));
    }

    pub(crate) fn add_artist(&self, artist: Artist, albums: Vec<Album>, eps_and_singles: Vec<Album>) {
        let mut state = self.state.lock().unwrap();
        state
            .artists
            .insert(artist.id.to_string(), (artist, albums, eps_and_singles));
    }

    pub(crate) fn add_playlist(&self, playlist: Playlist, items: Vec<Track>) {
        let items = items
            .into_iter()
            .map(|item| PlaylistItem {
                item_type: Some(if item.is_video() { "video" } else { "track" }.to_string()),
                item,
            })
            .collect();
        let mut state = self.state.lock().unwrap();
        state.playlists.insert(playlist.uuid.clone(), (playlist, items));
    }

    pub(crate) fn add_stream(&self, track_id: u64, tier: QualityTier, stream: StreamUrl) {
        let mut state = self.state.lock().unwrap();
        state.streams.insert((track_id, tier), stream);
    }

    pub(crate) fn add_video_stream(&self, video_id: u64, url: String) {
        let mut state = self.state.lock().unwrap();
        state.video_streams.insert(video_id, url);
    }

    pub(crate) fn set_search_results(&self, results: SearchResults) {
        self.state.lock().unwrap().search = results;
    }

    /// Only the named sessions may see `id`; everyone else gets a region lock
    pub(crate) fn lock_region(&self, id: &str, allowed_sessions: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.region_locks.insert(
            id.to_string(),
            allowed_sessions.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Lookups of `id` fail with an authorization error
    pub(crate) fn deny(&self, id: &str) {
        self.state.lock().unwrap().unauthorized.insert(id.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Sessions that called `method` for `id`, in call order
    pub(crate) fn sessions_for(&self, method: &str, id: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.id == id)
            .map(|c| c.session)
            .collect()
    }

    /// Record the call, then apply authorization and region locks
    fn lookup<T>(
        &self,
        method: &'static str,
        resource: &str,
        session: &Session,
        id: &str,
        find: impl FnOnce(&CatalogState) -> Option<T>,
    ) -> CatalogResult<T> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CatalogCall {
            method,
            session: session.name.clone(),
            id: id.to_string(),
        });

        if state.unauthorized.contains(id) {
            return Err(CatalogError::Unauthorized("access denied".to_string()));
        }
        if let Some(allowed) = state.region_locks.get(id) {
            if !allowed.contains(&session.name) {
                return Err(CatalogError::RegionLocked {
                    resource: resource.to_string(),
                    id: id.to_string(),
                });
            }
        }
        find(&state).ok_or_else(|| CatalogError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl CatalogClient for MockCatalog {
    async fn get_track(&self, session: &Session, id: &str) -> CatalogResult<Track> {
        self.lookup("get_track", "track", session, id, |s| s.tracks.get(id).cloned())
    }

    async fn get_playlist(&self, session: &Session, id: &str) -> CatalogResult<Playlist> {
        self.lookup("get_playlist", "playlist", session, id, |s| {
            s.playlists.get(id).map(|(p, _)| p.clone())
        })
    }

    async fn get_playlist_items(&self, session: &Session, id: &str) -> CatalogResult<Page<PlaylistItem>> {
        self.lookup("get_playlist_items", "playlist", session, id, |s| {
            s.playlists.get(id).map(|(_, items)| Page::from_items(items.clone()))
        })
    }

    async fn get_album(&self, session: &Session, id: &str) -> CatalogResult<Album> {
        self.lookup("get_album", "album", session, id, |s| {
            s.albums.get(id).map(|(a, _)| a.clone())
        })
    }

    async fn get_album_tracks(&self, session: &Session, id: &str) -> CatalogResult<Page<Track>> {
        self.lookup("get_album_tracks", "album", session, id, |s| {
            s.albums.get(id).map(|(_, tracks)| Page::from_items(tracks.clone()))
        })
    }

    async fn get_artist(&self, session: &Session, id: &str) -> CatalogResult<Artist> {
        self.lookup("get_artist", "artist", session, id, |s| {
            s.artists.get(id).map(|(a, _, _)| a.clone())
        })
    }

    async fn get_artist_albums(&self, session: &Session, id: &str) -> CatalogResult<Page<Album>> {
        self.lookup("get_artist_albums", "artist", session, id, |s| {
            s.artists.get(id).map(|(_, albums, _)| Page::from_items(albums.clone()))
        })
    }

    async fn get_artist_albums_eps_singles(&self, session: &Session, id: &str) -> CatalogResult<Page<Album>> {
        self.lookup("get_artist_albums_eps_singles", "artist", session, id, |s| {
            s.artists.get(id).map(|(_, _, eps)| Page::from_items(eps.clone()))
        })
    }

    async fn get_video(&self, session: &Session, id: &str) -> CatalogResult<Track> {
        self.lookup("get_video", "video", session, id, |s| s.videos.get(id).cloned())
    }

    async fn search(&self, session: &Session, query: &str, _limit: usize) -> CatalogResult<SearchResults> {
        self.lookup("search", "search", session, query, |s| Some(s.search.clone()))
    }

    async fn stream_url(&self, session: &Session, track_id: u64, quality: QualityTier) -> CatalogResult<StreamUrl> {
        let id = track_id.to_string();
        self.lookup("stream_url", "track", session, &id, |s| {
            s.streams.get(&(track_id, quality)).cloned()
        })
    }

    async fn video_stream_url(&self, session: &Session, video_id: u64) -> CatalogResult<VideoStreamUrl> {
        let id = video_id.to_string();
        self.lookup("video_stream_url", "video", session, &id, |s| {
            s.video_streams.get(&video_id).map(|url| VideoStreamUrl { url: url.clone() })
        })
    }
}

/// One recorded backend download
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BackendCall {
    pub(crate) track_id: u64,
    pub(crate) session: String,
    pub(crate) track_number: Option<u32>,
}

#[derive(Default)]
struct BackendState {
    present: HashSet<u64>,
    available_in: HashMap<u64, HashSet<String>>,
    broken: HashSet<u64>,
    calls: Vec<BackendCall>,
}

/// Backend that "writes" tracks into memory
#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<BackendState>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Streams for `track_id` exist only for the named sessions
    pub(crate) fn available_only_in(&self, track_id: u64, sessions: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .available_in
            .insert(track_id, sessions.iter().map(|s| s.to_string()).collect());
    }

    /// Downloads of `track_id` fail with a non-retryable error
    pub(crate) fn break_track(&self, track_id: u64) {
        self.state.lock().unwrap().broken.insert(track_id);
    }

    /// Pretend an artifact for `track_id` is already on disk
    pub(crate) fn mark_present(&self, track_id: u64) {
        self.state.lock().unwrap().present.insert(track_id);
    }

    pub(crate) fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn outcome(job: &DownloadJob, already_present: bool) -> DownloadOutcome {
        let location = job.target_dir();
        DownloadOutcome {
            file: location.join(format!("{}.flac", job.file_stem())),
            location,
            already_present,
        }
    }
}

#[async_trait::async_trait]
impl DownloadBackend for MockBackend {
    async fn existing(&self, job: &DownloadJob) -> Option<DownloadOutcome> {
        let present = self.state.lock().unwrap().present.contains(&job.track.id);
        present.then(|| Self::outcome(job, true))
    }

    async fn download(&self, job: &DownloadJob) -> Result<DownloadOutcome, DownloadError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BackendCall {
            track_id: job.track.id,
            session: job.session.name.clone(),
            track_number: job.track_number,
        });

        if state.broken.contains(&job.track.id) {
            return Err(DownloadError::InvalidManifest("corrupt manifest".to_string()));
        }
        if let Some(allowed) = state.available_in.get(&job.track.id) {
            if !allowed.contains(&job.session.name) {
                return Err(DownloadError::Unavailable {
                    track_id: job.track.id,
                    reason: format!("not available in {}", job.session.country_code),
                });
            }
        }
        state.present.insert(job.track.id);
        Ok(Self::outcome(job, false))
    }
}

/// Fixed sessions: the default plus a regional pool
pub(crate) struct MockSessionStore {
    pub(crate) default: Session,
    pub(crate) pool: Vec<Session>,
}

impl MockSessionStore {
    pub(crate) fn new(default: &str, pool: &[&str]) -> Self {
        Self {
            default: session(default),
            pool: pool.iter().map(|name| session(name)).collect(),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for MockSessionStore {
    async fn load_session(&self, _name: &str) -> crate::error::Result<Session> {
        Ok(self.default.clone())
    }

    async fn regional_sessions(&self) -> crate::error::Result<Vec<Session>> {
        Ok(self.pool.clone())
    }
}

pub(crate) fn session(name: &str) -> Session {
    Session::new(name, name, format!("token-{name}"))
}

pub(crate) fn track(id: u64, title: &str) -> Track {
    Track {
        id,
        title: title.to_string(),
        version: None,
        explicit: false,
        artists: vec![ArtistRef {
            id: 1,
            name: "Artist".to_string(),
        }],
        audio_modes: vec!["STEREO".to_string()],
        track_number: Some(1),
        volume_number: Some(1),
        album: Some(AlbumRef {
            id: 0,
            title: "Album".to_string(),
        }),
        duration: Some(180),
        media_type: None,
    }
}

pub(crate) fn album(id: u64, title: &str, album_type: &str, number_of_tracks: u32) -> Album {
    Album {
        id,
        title: title.to_string(),
        number_of_tracks: Some(number_of_tracks),
        audio_modes: vec!["STEREO".to_string()],
        album_type: Some(album_type.to_string()),
        artist: Some(ArtistRef {
            id: 1,
            name: "Artist".to_string(),
        }),
        artists: Vec::new(),
        release_date: None,
        explicit: false,
    }
}

pub(crate) fn playlist(uuid: &str, title: &str, creator_id: u64, creator: &str) -> Playlist {
    Playlist {
        uuid: uuid.to_string(),
        title: title.to_string(),
        creator: Creator {
            id: Some(creator_id),
            name: Some(creator.to_string()),
        },
        number_of_tracks: None,
    }
}
