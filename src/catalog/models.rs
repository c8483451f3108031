//! Wire records returned by the catalog API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Audio mode marking a Sony 360 Reality Audio edition
pub const SONY_360RA: &str = "SONY_360RA";

/// Audio mode marking a Dolby Atmos release
pub const DOLBY_ATMOS: &str = "DOLBY_ATMOS";

/// Artist reference embedded in tracks and albums
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRef {
    /// Artist id
    pub id: u64,
    /// Display name
    pub name: String,
}

/// Album reference embedded in tracks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRef {
    /// Album id
    pub id: u64,
    /// Album title
    pub title: String,
}

/// Track or video record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track id
    pub id: u64,
    /// Title
    pub title: String,
    /// Version suffix such as "Live" or "Remastered"
    #[serde(default)]
    pub version: Option<String>,
    /// Parental advisory flag
    #[serde(default)]
    pub explicit: bool,
    /// Credited artists, main artist first
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Audio modes such as "STEREO" or "DOLBY_ATMOS"
    #[serde(default)]
    pub audio_modes: Vec<String>,
    /// Position on its album
    #[serde(default)]
    pub track_number: Option<u32>,
    /// Disc number on its album
    #[serde(default)]
    pub volume_number: Option<u32>,
    /// Album the track belongs to
    #[serde(default)]
    pub album: Option<AlbumRef>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    /// Record type; present on videos ("Music Video")
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
}

impl Track {
    /// True for music videos
    pub fn is_video(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains("video"))
    }

    /// First credited artist
    pub fn main_artist_name(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    /// Title with its version suffix, e.g. "Song (Live)"
    pub fn full_title(&self) -> String {
        match self.version.as_deref() {
            Some(v) if !v.is_empty() => format!("{} ({})", self.title, v),
            _ => self.title.clone(),
        }
    }
}

/// Album record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Album id
    pub id: u64,
    /// Title
    pub title: String,
    /// Number of tracks
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
    /// Audio modes such as "STEREO" or "SONY_360RA"
    #[serde(default)]
    pub audio_modes: Vec<String>,
    /// Release type: "ALBUM", "EP" or "SINGLE"
    #[serde(default, rename = "type")]
    pub album_type: Option<String>,
    /// Main artist
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    /// Credited artists
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Release date (YYYY-MM-DD)
    #[serde(default)]
    pub release_date: Option<String>,
    /// Parental advisory flag
    #[serde(default)]
    pub explicit: bool,
}

impl Album {
    /// Main artist name, falling back to the first credited artist
    pub fn main_artist_name(&self) -> Option<&str> {
        self.artist
            .as_ref()
            .or_else(|| self.artists.first())
            .map(|a| a.name.as_str())
    }

    /// True when the album is a Sony 360 Reality Audio edition
    pub fn is_spatial_edition(&self) -> bool {
        self.audio_modes.iter().any(|m| m == SONY_360RA)
    }
}

/// Playlist creator
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Creator id; 0 marks editorial playlists
    #[serde(default)]
    pub id: Option<u64>,
    /// Creator name, absent for most users
    #[serde(default)]
    pub name: Option<String>,
}

/// Playlist record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Playlist UUID
    pub uuid: String,
    /// Title
    pub title: String,
    /// Creator
    #[serde(default)]
    pub creator: Creator,
    /// Number of tracks
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
}

/// Entry of a playlist listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    /// Nested track or video
    pub item: Track,
    /// "track" or "video"
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
}

/// Artist record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Artist id
    pub id: u64,
    /// Display name
    pub name: String,
}

/// One page (or the concatenation of all pages) of a listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in catalog order
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of items across all pages
    #[serde(default)]
    pub total_number_of_items: usize,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_number_of_items: 0,
        }
    }
}

impl<T> Page<T> {
    /// Page holding exactly these items
    pub fn from_items(items: Vec<T>) -> Self {
        let total_number_of_items = items.len();
        Self {
            items,
            total_number_of_items,
        }
    }
}

/// Search response, one listing per resource type
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Matching artists
    #[serde(default)]
    pub artists: Page<Artist>,
    /// Matching albums
    #[serde(default)]
    pub albums: Page<Album>,
    /// Matching tracks
    #[serde(default)]
    pub tracks: Page<Track>,
}

/// Direct stream location for one quality tier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamUrl {
    /// Media URL
    pub url: String,
    /// Codec, e.g. "FLAC" or "AAC"
    #[serde(default)]
    pub codec: Option<String>,
    /// Key for encrypted streams; empty for plain ones
    #[serde(default)]
    pub encryption_key: Option<String>,
    /// Quality actually served
    #[serde(default)]
    pub sound_quality: Option<String>,
}

impl StreamUrl {
    /// True when the payload needs decryption before use
    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// File extension matching the codec
    pub fn extension(&self) -> &'static str {
        match self.codec.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("FLAC") | Some("ALAC") | Some("MQA") => "flac",
            _ => "m4a",
        }
    }
}

/// HLS master playlist location for a video
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStreamUrl {
    /// Master playlist URL
    pub url: String,
}
