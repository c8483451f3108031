//! Search result shaping: the first [`SEARCH_LIMIT`] hits, Dolby Atmos releases split out

use crate::catalog::models::DOLBY_ATMOS;
use crate::catalog::{Album, Artist, SearchResults, Track};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of hits returned per search
pub const SEARCH_LIMIT: usize = 20;

/// What to search for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Tracks
    Track,
    /// Albums
    Album,
    /// Artists
    Artist,
}

impl std::str::FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(SearchKind::Track),
            "album" => Ok(SearchKind::Album),
            "artist" => Ok(SearchKind::Artist),
            other => Err(format!("invalid search type: {other}")),
        }
    }
}

/// Full catalog record behind a hit
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchItem {
    /// Track record
    Track(Track),
    /// Album record
    Album(Album),
}

/// One summarised hit
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SearchHit {
    /// Catalog id
    pub id: u64,
    /// First credited artist
    pub artist: String,
    /// Title
    pub title: String,
    /// `" [E]"` for explicit releases, empty otherwise
    pub explicit: String,
    /// The record itself
    #[serde(rename = "song")]
    pub item: SearchItem,
}

/// Search response body
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchResponse {
    /// Track or album hits
    Media {
        /// Hits whose only audio mode is Dolby Atmos
        #[serde(rename = "dolbyTracks")]
        dolby_tracks: Vec<SearchHit>,
        /// Everything else
        others: Vec<SearchHit>,
    },
    /// Artist hits, unranked
    Artists(Vec<Artist>),
}

/// Shape raw catalog results for `kind`
pub fn rank(results: SearchResults, kind: SearchKind) -> SearchResponse {
    let hits: Vec<(SearchHit, bool)> = match kind {
        SearchKind::Artist => return SearchResponse::Artists(results.artists.items),
        SearchKind::Track => {
            let limit = results.tracks.total_number_of_items.min(SEARCH_LIMIT);
            results
                .tracks
                .items
                .into_iter()
                .take(limit)
                .map(|track| {
                    let dolby = is_dolby_only(&track.audio_modes);
                    let hit = SearchHit {
                        id: track.id,
                        artist: track.main_artist_name().unwrap_or_default().to_string(),
                        title: track.title.clone(),
                        explicit: explicit_tag(track.explicit),
                        item: SearchItem::Track(track),
                    };
                    (hit, dolby)
                })
                .collect()
        }
        SearchKind::Album => {
            let limit = results.albums.total_number_of_items.min(SEARCH_LIMIT);
            results
                .albums
                .items
                .into_iter()
                .take(limit)
                .map(|album| {
                    let dolby = is_dolby_only(&album.audio_modes);
                    let hit = SearchHit {
                        id: album.id,
                        artist: album.main_artist_name().unwrap_or_default().to_string(),
                        title: album.title.clone(),
                        explicit: explicit_tag(album.explicit),
                        item: SearchItem::Album(album),
                    };
                    (hit, dolby)
                })
                .collect()
        }
    };

    let (dolby, others): (Vec<_>, Vec<_>) = hits.into_iter().partition(|(_, dolby)| *dolby);
    SearchResponse::Media {
        dolby_tracks: dolby.into_iter().map(|(hit, _)| hit).collect(),
        others: others.into_iter().map(|(hit, _)| hit).collect(),
    }
}

fn is_dolby_only(audio_modes: &[String]) -> bool {
    matches!(audio_modes, [mode] if mode == DOLBY_ATMOS)
}

fn explicit_tag(explicit: bool) -> String {
    if explicit { " [E]" } else { "" }.to_string()
}
