//! Expanding an identifier of a known kind into an ordered list of items.
//!
//! Every catalog lookup runs through the caller's [`RegionFailover`], so a
//! region-locked lookup is retried with the next regional session and the session
//! that finally worked stays active for the rest of the expansion (and for the
//! downloads that follow).
//!
//! Ordering per kind:
//! - track, video: one item
//! - playlist: stored order
//! - album: catalog order, all items share one [`AlbumContext`]
//! - artist: every EP/album group, then every single group, each in catalog order
//! - file: line order, lines that cannot be fetched are skipped

pub mod filters;

pub use filters::{FilterPipeline, FilteredAlbums, TrackGroup};

use crate::catalog::{CatalogClient, CatalogResult, Playlist};
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::retry::{FailoverError, RegionFailover};
use crate::session::Session;
use crate::types::{AlbumContext, AlbumType, Event, MediaKind, ResolvedItem};
use crate::utils::sanitize_name;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Expansion result
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMedia {
    /// Kind the identifier was expanded as
    pub kind: MediaKind,
    /// Items in download order
    pub items: Vec<ResolvedItem>,
    /// Output subdirectory, set for playlists
    pub subdirectory: Option<String>,
    /// Artist or playlist name, when the kind has one
    pub display_name: Option<String>,
}

impl ResolvedMedia {
    fn new(kind: MediaKind, items: Vec<ResolvedItem>) -> Self {
        Self {
            kind,
            items,
            subdirectory: None,
            display_name: None,
        }
    }
}

/// Turns identifiers into ordered [`ResolvedItem`]s
#[derive(Clone)]
pub struct MediaResolver {
    catalog: Arc<dyn CatalogClient>,
    filters: FilterPipeline,
    events: Option<broadcast::Sender<Event>>,
}

impl MediaResolver {
    /// Create a resolver
    pub fn new(catalog: Arc<dyn CatalogClient>, filters: FilterPipeline) -> Self {
        Self {
            catalog,
            filters,
            events: None,
        }
    }

    /// Report progress and filter decisions on this channel
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Expand `identifier` as `kind`.
    ///
    /// Returns [`Error::NotResolvable`] when every regional session failed with a
    /// region lock. Any other catalog failure propagates unchanged. An expansion that
    /// legitimately yields nothing returns an empty item list.
    pub async fn resolve(
        &self,
        failover: &mut RegionFailover<'_>,
        identifier: &Identifier,
        kind: MediaKind,
    ) -> Result<ResolvedMedia> {
        let id = identifier.id();
        self.emit(Event::ResolutionStarted {
            id: id.to_string(),
            kind,
        });
        tracing::debug!(id, %kind, session = %failover.active().name, "Resolving identifier");

        let resolved = match (kind, identifier) {
            (MediaKind::File, Identifier::File { content }) => {
                self.resolve_file(failover, content).await?
            }
            (MediaKind::File, _) => {
                return Err(Error::InvalidIdentifier(format!(
                    "{id} is not a list of track ids"
                )));
            }
            (MediaKind::Track, _) => self.resolve_track(failover, id).await?,
            (MediaKind::Video, _) => self.resolve_video(failover, id).await?,
            (MediaKind::Playlist, _) => self.resolve_playlist(failover, id).await?,
            (MediaKind::Album, _) => self.resolve_album(failover, id).await?,
            (MediaKind::Artist, _) => self.resolve_artist(failover, id).await?,
        };

        tracing::info!(id, %kind, items = resolved.items.len(), "Identifier resolved");
        self.emit(Event::Resolved {
            id: id.to_string(),
            items: resolved.items.len(),
        });
        Ok(resolved)
    }

    async fn resolve_track(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<ResolvedMedia> {
        let catalog = self.catalog.as_ref();
        let track = fetch(failover, id, |s| async move { catalog.get_track(&s, id).await }).await?;
        Ok(ResolvedMedia::new(
            MediaKind::Track,
            vec![ResolvedItem::standalone(track)],
        ))
    }

    async fn resolve_video(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<ResolvedMedia> {
        let catalog = self.catalog.as_ref();
        let video = fetch(failover, id, |s| async move { catalog.get_video(&s, id).await }).await?;
        Ok(ResolvedMedia::new(
            MediaKind::Video,
            vec![ResolvedItem::standalone(video)],
        ))
    }

    async fn resolve_playlist(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<ResolvedMedia> {
        let catalog = self.catalog.as_ref();
        let playlist =
            fetch(failover, id, |s| async move { catalog.get_playlist(&s, id).await }).await?;
        let page = fetch(failover, id, |s| async move {
            catalog.get_playlist_items(&s, id).await
        })
        .await?;

        let items = page
            .items
            .into_iter()
            .map(|entry| {
                let mut track = entry.item;
                if track.media_type.is_none() && entry.item_type.as_deref() == Some("video") {
                    track.media_type = Some("Music Video".to_string());
                }
                ResolvedItem::standalone(track)
            })
            .collect();

        Ok(ResolvedMedia {
            kind: MediaKind::Playlist,
            items,
            subdirectory: Some(playlist_directory(&playlist)),
            display_name: Some(playlist.title),
        })
    }

    async fn resolve_album(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<ResolvedMedia> {
        let group = self.fetch_album_group(failover, id).await?;
        let context = group.context;
        let items = group
            .tracks
            .into_iter()
            .map(|track| ResolvedItem {
                track,
                album: Some(context.clone()),
            })
            .collect();
        Ok(ResolvedMedia::new(MediaKind::Album, items))
    }

    async fn resolve_artist(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<ResolvedMedia> {
        let catalog = self.catalog.as_ref();
        let artist = fetch(failover, id, |s| async move { catalog.get_artist(&s, id).await }).await?;
        let mut albums = fetch(failover, id, |s| async move {
            catalog.get_artist_albums(&s, id).await
        })
        .await?
        .items;
        let eps_and_singles = fetch(failover, id, |s| async move {
            catalog.get_artist_albums_eps_singles(&s, id).await
        })
        .await?;
        albums.extend(eps_and_singles.items);

        let filtered = self.filters.filter_albums(albums);
        for (title, reason) in filtered.skipped {
            tracing::info!(artist = %artist.name, album = %title, ?reason, "Skipping album");
            self.emit(Event::AlbumSkipped { title, reason });
        }

        let mut eps = Vec::new();
        let mut singles = Vec::new();
        for album in &filtered.kept {
            let group = self.fetch_album_group(failover, &album.id.to_string()).await?;
            if group.context.album_type == AlbumType::Single {
                singles.push(group);
            } else {
                eps.push(group);
            }
        }

        let (singles, skipped) = self.filters.dedup_singles(&eps, singles);
        for title in skipped {
            tracing::info!(artist = %artist.name, track = %title, "Skipping single already on an album");
            self.emit(Event::TrackSkipped { title });
        }

        let items = eps
            .into_iter()
            .chain(singles)
            .flat_map(|group| {
                let context = group.context;
                group.tracks.into_iter().map(move |track| ResolvedItem {
                    track,
                    album: Some(context.clone()),
                })
            })
            .collect();

        Ok(ResolvedMedia {
            kind: MediaKind::Artist,
            items,
            subdirectory: None,
            display_name: Some(artist.name),
        })
    }

    async fn resolve_file(&self, failover: &mut RegionFailover<'_>, content: &str) -> Result<ResolvedMedia> {
        let catalog = self.catalog.as_ref();
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let total = lines.len();

        let mut items = Vec::with_capacity(total);
        let mut exhausted = false;
        for (index, line) in lines.into_iter().enumerate() {
            self.emit(Event::TrackInfoProgress {
                current: index + 1,
                total,
            });
            // Each line is its own lookup with its own rotation
            failover.restart();
            match fetch(failover, line, |s| async move { catalog.get_track(&s, line).await }).await {
                Ok(track) => items.push(ResolvedItem::standalone(track)),
                Err(e) => {
                    exhausted |= matches!(e, Error::NotResolvable { .. });
                    tracing::warn!(line = index + 1, id = line, error = %e, "Skipping track id");
                }
            }
        }

        if items.is_empty() && exhausted {
            return Err(Error::NotResolvable {
                id: "<file>".to_string(),
            });
        }
        Ok(ResolvedMedia::new(MediaKind::File, items))
    }

    async fn fetch_album_group(&self, failover: &mut RegionFailover<'_>, id: &str) -> Result<TrackGroup> {
        let catalog = self.catalog.as_ref();
        let album = fetch(failover, id, |s| async move { catalog.get_album(&s, id).await }).await?;
        let tracks = fetch(failover, id, |s| async move {
            catalog.get_album_tracks(&s, id).await
        })
        .await?;
        Ok(TrackGroup {
            tracks: tracks.items,
            context: AlbumContext::from(&album),
        })
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}

/// One catalog lookup under failover; exhaustion becomes [`Error::NotResolvable`]
async fn fetch<T, F, Fut>(failover: &mut RegionFailover<'_>, id: &str, operation: F) -> Result<T>
where
    F: FnMut(Session) -> Fut,
    Fut: Future<Output = CatalogResult<T>>,
{
    failover.run(operation).await.map_err(|e| match e {
        FailoverError::Exhausted(last) => {
            tracing::debug!(id, error = %last, "Region failover exhausted");
            Error::NotResolvable { id: id.to_string() }
        }
        FailoverError::Failed(e) => Error::Catalog(e),
    })
}

/// `"Creator - Title"` for user playlists, the title alone for editorial ones
fn playlist_directory(playlist: &Playlist) -> String {
    let creator = playlist
        .creator
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty() && playlist.creator.id != Some(0));
    match creator {
        Some(name) => format!("{} - {}", sanitize_name(name), sanitize_name(&playlist.title)),
        None => sanitize_name(&playlist.title),
    }
}
