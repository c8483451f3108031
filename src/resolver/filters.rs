//! Artist expansion filters.
//!
//! Applied in a fixed order, each to the output of the previous one:
//! 1. remix filtering on album titles
//! 2. spatial-audio duplicate suppression
//! 3. single/EP track deduplication, after tracks are bucketed
//!
//! All three are pure; the resolver reports what they dropped.

use crate::catalog::{Album, Track};
use crate::config::Preset;
use crate::types::{AlbumContext, AlbumSkipReason};
use std::collections::HashSet;

/// Title fragments that mark remix, commentary and karaoke releases
const REMIX_MARKERS: [&str; 3] = ["remix", "commentary", "karaoke"];

/// Tracks of one album together with its context
#[derive(Clone, Debug, PartialEq)]
pub struct TrackGroup {
    /// Tracks in catalog order
    pub tracks: Vec<Track>,
    /// Album the tracks belong to
    pub context: AlbumContext,
}

/// Albums that survived rules 1 and 2, plus what was dropped
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredAlbums {
    /// Surviving albums in input order
    pub kept: Vec<Album>,
    /// Titles dropped and the rule that dropped them
    pub skipped: Vec<(String, AlbumSkipReason)>,
}

/// Toggleable artist filters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterPipeline {
    /// Rule 1
    pub remix_filtering: bool,
    /// Rule 2
    pub skip_spatial_duplicates: bool,
    /// Rule 3
    pub skip_singles_when_possible: bool,
}

impl From<&Preset> for FilterPipeline {
    fn from(preset: &Preset) -> Self {
        Self {
            remix_filtering: preset.aggressive_remix_filtering,
            skip_spatial_duplicates: preset.skip_360ra,
            skip_singles_when_possible: preset.skip_singles_when_possible,
        }
    }
}

impl FilterPipeline {
    /// Apply rules 1 and 2 to an artist's albums
    pub fn filter_albums(&self, albums: Vec<Album>) -> FilteredAlbums {
        let mut skipped = Vec::new();

        let albums: Vec<Album> = if self.remix_filtering {
            albums
                .into_iter()
                .filter(|album| {
                    let remix = is_remix_title(&album.title);
                    if remix {
                        skipped.push((album.title.clone(), AlbumSkipReason::Remix));
                    }
                    !remix
                })
                .collect()
        } else {
            albums
        };

        let kept = if self.skip_spatial_duplicates {
            let duplicates: Vec<bool> = albums
                .iter()
                .map(|album| is_spatial_duplicate(album, &albums))
                .collect();
            albums
                .into_iter()
                .zip(duplicates)
                .filter_map(|(album, duplicate)| {
                    if duplicate {
                        skipped.push((album.title.clone(), AlbumSkipReason::SpatialDuplicate));
                        None
                    } else {
                        Some(album)
                    }
                })
                .collect()
        } else {
            albums
        };

        FilteredAlbums { kept, skipped }
    }

    /// Apply rule 3: drop single tracks whose title appears in any EP/album group.
    ///
    /// Returns the remaining single groups and the titles that were dropped.
    /// Groups emptied by the rule are removed.
    pub fn dedup_singles(
        &self,
        eps: &[TrackGroup],
        singles: Vec<TrackGroup>,
    ) -> (Vec<TrackGroup>, Vec<String>) {
        if !self.skip_singles_when_possible {
            return (singles, Vec::new());
        }

        // Title equality only; ids differ between a single and its album release
        let ep_titles: HashSet<&str> = eps
            .iter()
            .flat_map(|group| group.tracks.iter().map(|t| t.title.as_str()))
            .collect();

        let mut skipped = Vec::new();
        let kept = singles
            .into_iter()
            .filter_map(|mut group| {
                let before = group.tracks.len();
                group.tracks.retain(|track| {
                    let duplicate = ep_titles.contains(track.title.as_str());
                    if duplicate {
                        skipped.push(track.title.clone());
                    }
                    !duplicate
                });
                let emptied = before > 0 && group.tracks.is_empty();
                (!emptied).then_some(group)
            })
            .collect();

        (kept, skipped)
    }
}

fn is_remix_title(title: &str) -> bool {
    let title = title.to_lowercase();
    REMIX_MARKERS.iter().any(|marker| title.contains(marker))
}

/// A spatial edition is a duplicate when a non-spatial album shares its title and track count
fn is_spatial_duplicate(album: &Album, candidates: &[Album]) -> bool {
    album.is_spatial_edition()
        && candidates.iter().any(|other| {
            !other.is_spatial_edition()
                && other.title == album.title
                && other.number_of_tracks == album.number_of_tracks
        })
}
