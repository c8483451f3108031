//! Core types and events for tidal-relay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

use crate::catalog::{Album, Track};

/// Kind of catalog resource an identifier names; selects the expansion strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A single track
    Track,
    /// A user or editorial playlist
    Playlist,
    /// An album, EP or single
    Album,
    /// Every release of an artist
    Artist,
    /// A single music video
    Video,
    /// Newline-separated list of track ids
    File,
}

impl MediaKind {
    /// Short lowercase name, used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Track => "track",
            MediaKind::Playlist => "playlist",
            MediaKind::Album => "album",
            MediaKind::Artist => "artist",
            MediaKind::Video => "video",
            MediaKind::File => "file",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "track" => Ok(MediaKind::Track),
            "playlist" => Ok(MediaKind::Playlist),
            "album" => Ok(MediaKind::Album),
            "artist" => Ok(MediaKind::Artist),
            "video" => Ok(MediaKind::Video),
            "file" => Ok(MediaKind::File),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// Stream quality tier, declared highest fidelity first
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    /// 24-bit hi-res
    HiRes,
    /// 16-bit lossless
    Lossless,
    /// 320 kbps AAC
    High,
    /// 96 kbps AAC
    Low,
}

impl QualityTier {
    /// Value the catalog expects in its `soundQuality` parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            QualityTier::HiRes => "HI_RES",
            QualityTier::Lossless => "LOSSLESS",
            QualityTier::High => "HIGH",
            QualityTier::Low => "LOW",
        }
    }

    const ALL: [QualityTier; 4] = [
        QualityTier::HiRes,
        QualityTier::Lossless,
        QualityTier::High,
        QualityTier::Low,
    ];
}

/// Ordered set of quality tiers to attempt
///
/// Each tier appears at most once and the order is always [`QualityTier`]'s
/// declaration order, whatever order the tiers were enabled in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QualityPreset {
    enabled: [bool; 4],
}

impl QualityPreset {
    /// Build a preset from (tier, enabled) pairs
    pub fn from_flags(flags: impl IntoIterator<Item = (QualityTier, bool)>) -> Self {
        let mut enabled = [false; 4];
        for (tier, on) in flags {
            enabled[tier as usize] |= on;
        }
        Self { enabled }
    }

    /// Tiers in attempt order
    pub fn iter(&self) -> impl Iterator<Item = QualityTier> + '_ {
        QualityTier::ALL
            .into_iter()
            .filter(|tier| self.enabled[*tier as usize])
    }

    /// True when no tier is enabled
    pub fn is_empty(&self) -> bool {
        !self.enabled.iter().any(|on| *on)
    }
}

/// Release type of an album as declared by the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    /// Full-length album (also the fallback for unknown types)
    Album,
    /// Extended play
    Ep,
    /// Single
    Single,
}

impl AlbumType {
    /// Case-insensitive parse of the catalog's `type` field
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("single") => AlbumType::Single,
            Some("ep") => AlbumType::Ep,
            _ => AlbumType::Album,
        }
    }
}

/// Grouping metadata attached to tracks for output layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlbumContext {
    /// Album id
    pub id: u64,
    /// Album title
    pub title: String,
    /// Main artist name, if known
    pub creator: Option<String>,
    /// Declared release type
    pub album_type: AlbumType,
    /// Number of tracks on the release
    pub number_of_tracks: Option<u32>,
}

impl From<&Album> for AlbumContext {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id,
            title: album.title.clone(),
            creator: album.main_artist_name().map(str::to_string),
            album_type: AlbumType::parse(album.album_type.as_deref()),
            number_of_tracks: album.number_of_tracks,
        }
    }
}

/// A track paired with the grouping it was resolved under
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ResolvedItem {
    /// The track (or video) record
    pub track: Track,
    /// Album grouping, absent for standalone tracks, videos and playlist items
    pub album: Option<AlbumContext>,
}

impl ResolvedItem {
    /// Item without album grouping
    pub fn standalone(track: Track) -> Self {
        Self { track, album: None }
    }
}

/// Which phase a session rotation happened in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Catalog lookups while expanding an identifier
    Resolve,
    /// Fetching a track's stream
    Download,
}

/// Why an album was left out of an artist expansion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlbumSkipReason {
    /// Title mentions remix, commentary or karaoke
    Remix,
    /// Immersive-audio edition duplicating a stereo release
    SpatialDuplicate,
}

/// Event emitted while resolving and downloading
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Expansion of an identifier started
    ResolutionStarted {
        /// Raw identifier
        id: String,
        /// Classified kind
        kind: MediaKind,
    },

    /// A region-locked operation is retried with another session
    SessionRotated {
        /// Session name
        session: String,
        /// Region of the new session
        country_code: String,
        /// Phase that triggered the rotation
        phase: Phase,
    },

    /// Per-line progress while reading a file of track ids
    TrackInfoProgress {
        /// 1-based line being fetched
        current: usize,
        /// Number of lines
        total: usize,
    },

    /// An album was dropped by the artist filters
    AlbumSkipped {
        /// Album title
        title: String,
        /// Which filter dropped it
        reason: AlbumSkipReason,
    },

    /// A single's track was dropped because an album or EP already has it
    TrackSkipped {
        /// Track title
        title: String,
    },

    /// Expansion finished
    Resolved {
        /// Raw identifier
        id: String,
        /// Number of items produced
        items: usize,
    },

    /// Identifier abandoned after every session failed
    IdentifierSkipped {
        /// Raw identifier
        id: String,
        /// Human-readable reason
        reason: String,
    },

    /// A track finished (or was already present)
    ItemCompleted {
        /// Track id
        track_id: u64,
        /// Track title
        title: String,
        /// Output location reported by the backend
        #[schema(value_type = String)]
        location: PathBuf,
        /// True when an existing artifact was kept
        already_present: bool,
    },

    /// A track was abandoned
    ItemFailed {
        /// Track id
        track_id: u64,
        /// Track title
        title: String,
        /// Error message
        error: String,
    },

    /// The whole batch finished
    BatchComplete {
        /// Location of the last completed item, if any
        #[schema(value_type = Option<String>)]
        location: Option<PathBuf>,
    },
}

impl Event {
    /// Value of the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Event::ResolutionStarted { .. } => "resolution_started",
            Event::SessionRotated { .. } => "session_rotated",
            Event::TrackInfoProgress { .. } => "track_info_progress",
            Event::AlbumSkipped { .. } => "album_skipped",
            Event::TrackSkipped { .. } => "track_skipped",
            Event::Resolved { .. } => "resolved",
            Event::IdentifierSkipped { .. } => "identifier_skipped",
            Event::ItemCompleted { .. } => "item_completed",
            Event::ItemFailed { .. } => "item_failed",
            Event::BatchComplete { .. } => "batch_complete",
        }
    }
}

/// Outcome of one batch entry
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Resolved and every item was attempted
    Processed {
        /// Items that completed (including already present ones)
        completed: usize,
        /// Items that were abandoned
        failed: usize,
        /// Location of the last completed item in this entry
        #[schema(value_type = Option<String>)]
        location: Option<PathBuf>,
    },
    /// No session could resolve the identifier
    Skipped,
    /// A non-retryable error stopped this entry
    Failed {
        /// Error message
        error: String,
    },
}

/// Per-identifier report inside a [`BatchReport`]
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct EntryReport {
    /// Raw identifier
    pub id: String,
    /// Classified kind
    pub kind: MediaKind,
    /// What happened
    pub outcome: EntryOutcome,
}

/// Result of processing a batch of identifiers
#[derive(Clone, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct BatchReport {
    /// Output location of the last successfully completed item across the batch
    #[schema(value_type = Option<String>)]
    pub location: Option<PathBuf>,
    /// One report per entry, in input order
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    /// Location as a display string, empty when nothing completed
    pub fn directory(&self) -> String {
        self.location
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}
