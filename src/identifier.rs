//! Parsing raw identifiers and classifying them into a [`MediaKind`].
//!
//! Accepted forms:
//! - numeric catalog ids (`"123456"`), whose kind is found by probing the catalog
//! - playlist UUIDs (`"0c5a...-4...-..."`)
//! - catalog URLs (`https://tidal.com/browse/album/123`, `https://listen.tidal.com/track/9`)
//! - in-memory lists of track ids, one per line ([`Identifier::file`])

use crate::catalog::CatalogClient;
use crate::error::{CatalogError, Error, Result};
use crate::session::Session;
use crate::types::MediaKind;
use regex::Regex;
use std::sync::LazyLock;

static PLAYLIST_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap_or_else(|e| unreachable!("static regex is valid: {e}"))
});

/// Hosts whose URLs name catalog resources
const CATALOG_HOSTS: &[&str] = &["tidal.com", "www.tidal.com", "listen.tidal.com"];

/// A parsed identifier. Immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    /// Bare numeric id of unknown kind
    Numeric(String),
    /// Playlist UUID
    Playlist(String),
    /// Id whose kind is already known (from a URL)
    Typed {
        /// Resource kind
        kind: MediaKind,
        /// Resource id
        id: String,
    },
    /// Newline separated track ids
    File {
        /// Raw file content
        content: String,
    },
}

impl Identifier {
    /// Parse a raw identifier string
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidIdentifier("empty identifier".to_string()));
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Identifier::Numeric(raw.to_string()));
        }
        if PLAYLIST_UUID.is_match(raw) {
            return Ok(Identifier::Playlist(raw.to_ascii_lowercase()));
        }
        if let Some(typed) = parse_catalog_url(raw) {
            return Ok(typed);
        }
        Err(Error::InvalidIdentifier(raw.to_string()))
    }

    /// Identifier for a list of track ids, one per line
    pub fn file(content: impl Into<String>) -> Self {
        Identifier::File {
            content: content.into(),
        }
    }

    /// The id string, or a short label for file content
    pub fn id(&self) -> &str {
        match self {
            Identifier::Numeric(id) | Identifier::Playlist(id) => id,
            Identifier::Typed { id, .. } => id,
            Identifier::File { .. } => "<file>",
        }
    }

    /// Kind known without a catalog lookup
    pub fn known_kind(&self) -> Option<MediaKind> {
        match self {
            Identifier::Numeric(_) => None,
            Identifier::Playlist(_) => Some(MediaKind::Playlist),
            Identifier::Typed { kind, .. } => Some(*kind),
            Identifier::File { .. } => Some(MediaKind::File),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

fn parse_catalog_url(raw: &str) -> Option<Identifier> {
    let url = url::Url::parse(raw).ok()?;
    let host = url.host_str()?;
    if !CATALOG_HOSTS.contains(&host) {
        return None;
    }

    let mut segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.first() == Some(&"browse") {
        segments.remove(0);
    }
    let [kind, id, ..] = segments.as_slice() else {
        return None;
    };

    let kind = match *kind {
        "track" => MediaKind::Track,
        "album" => MediaKind::Album,
        "playlist" => MediaKind::Playlist,
        "artist" => MediaKind::Artist,
        "video" => MediaKind::Video,
        _ => return None,
    };
    let valid = match kind {
        MediaKind::Playlist => PLAYLIST_UUID.is_match(id),
        _ => id.bytes().all(|b| b.is_ascii_digit()),
    };
    valid.then(|| Identifier::Typed {
        kind,
        id: id.to_string(),
    })
}

/// Determine the media kind of an identifier.
///
/// Numeric ids are tried as album, artist, track and video, in that order, with
/// `session`; the first lookup that succeeds decides. Playlist UUIDs are confirmed
/// with a playlist lookup, whose failure is returned as-is.
pub async fn classify(
    catalog: &dyn CatalogClient,
    session: &Session,
    identifier: &Identifier,
) -> Result<MediaKind> {
    match identifier {
        Identifier::Playlist(id) => {
            catalog.get_playlist(session, id).await?;
            Ok(MediaKind::Playlist)
        }
        Identifier::Numeric(id) => {
            if is_found(catalog.get_album(session, id).await)? {
                return Ok(MediaKind::Album);
            }
            if is_found(catalog.get_artist(session, id).await)? {
                return Ok(MediaKind::Artist);
            }
            if is_found(catalog.get_track(session, id).await)? {
                return Ok(MediaKind::Track);
            }
            if is_found(catalog.get_video(session, id).await)? {
                return Ok(MediaKind::Video);
            }
            Err(Error::InvalidIdentifier(id.clone()))
        }
        Identifier::Typed { kind, .. } => Ok(*kind),
        Identifier::File { .. } => Ok(MediaKind::File),
    }
}

/// Absent resources mean "try the next kind"; other failures abort classification
fn is_found<T>(result: std::result::Result<T, CatalogError>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(CatalogError::NotFound { .. } | CatalogError::RegionLocked { .. }) => Ok(false),
        // Wrong-kind lookups of numeric ids commonly come back as 400
        Err(CatalogError::Http { status: 400, .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
