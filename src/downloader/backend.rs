//! Download backend: turns one resolved track into a file on disk.
//!
//! [`HttpDownloadBackend`] asks the catalog for a stream at each quality tier of the
//! preset in turn and writes the first usable one. Videos are fetched as HLS and the
//! segments of the best variant are concatenated into a `.ts` file.

use crate::catalog::{CatalogClient, Track};
use crate::error::{CatalogError, DownloadError, Error, Result};
use crate::session::Session;
use crate::types::{AlbumContext, QualityPreset};
use crate::utils::{album_directory_name, find_existing_artifact, track_file_stem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Everything the backend needs to fetch one item
#[derive(Clone, Debug)]
pub struct DownloadJob {
    /// Session used for stream lookups
    pub session: Session,
    /// Track or video to fetch
    pub track: Track,
    /// Album grouping, if the track was resolved under one
    pub album: Option<AlbumContext>,
    /// Replace existing artifacts
    pub overwrite: bool,
    /// Positional number overriding the catalog track number (playlists)
    pub track_number: Option<u32>,
    /// Base directory, including any playlist subdirectory
    pub output_dir: PathBuf,
}

impl DownloadJob {
    /// Directory the artifact is written to
    pub fn target_dir(&self) -> PathBuf {
        match &self.album {
            Some(album) => self
                .output_dir
                .join(album_directory_name(album.creator.as_deref(), &album.title)),
            None => self.output_dir.clone(),
        }
    }

    /// Artifact file name without extension
    pub fn file_stem(&self) -> String {
        let number = self.track_number.or(self.track.track_number);
        track_file_stem(number, &self.track.full_title())
    }
}

/// Where a finished item ended up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Directory holding the artifact
    pub location: PathBuf,
    /// The artifact itself
    pub file: PathBuf,
    /// True when an existing artifact was kept instead of downloading
    pub already_present: bool,
}

impl DownloadOutcome {
    fn present(file: PathBuf) -> Self {
        Self {
            location: file.parent().map(Path::to_path_buf).unwrap_or_default(),
            file,
            already_present: true,
        }
    }
}

/// Fetches tracks for the orchestrator
#[async_trait::async_trait]
pub trait DownloadBackend: Send + Sync {
    /// An artifact for `job` that already exists on disk. Must not touch the network.
    async fn existing(&self, job: &DownloadJob) -> Option<DownloadOutcome>;

    /// Download `job`. Returns [`DownloadError::Unavailable`] when the session cannot
    /// get a stream for the item; other variants are not worth retrying elsewhere.
    async fn download(&self, job: &DownloadJob) -> std::result::Result<DownloadOutcome, DownloadError>;
}

/// Backend that fetches streams over HTTP
pub struct HttpDownloadBackend {
    catalog: Arc<dyn CatalogClient>,
    client: reqwest::Client,
    preset: QualityPreset,
}

impl HttpDownloadBackend {
    /// Create a backend trying the tiers of `preset` highest first
    pub fn new(catalog: Arc<dyn CatalogClient>, preset: QualityPreset, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tidal-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            catalog,
            client,
            preset,
        })
    }

    async fn download_audio(
        &self,
        job: &DownloadJob,
        dir: &Path,
        stem: &str,
    ) -> std::result::Result<PathBuf, DownloadError> {
        let mut last_reason = "no quality tier enabled".to_string();

        for tier in self.preset.iter() {
            let stream = match self.catalog.stream_url(&job.session, job.track.id, tier).await {
                Ok(stream) => stream,
                Err(e @ (CatalogError::NotFound { .. } | CatalogError::RegionLocked { .. })) => {
                    tracing::debug!(track_id = job.track.id, quality = tier.as_api_str(), error = %e, "No stream at quality");
                    last_reason = e.to_string();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if stream.url.is_empty() || stream.is_encrypted() {
                tracing::debug!(
                    track_id = job.track.id,
                    quality = tier.as_api_str(),
                    encrypted = stream.is_encrypted(),
                    "Unusable stream, trying next quality"
                );
                last_reason = format!("{} stream is not usable", tier.as_api_str());
                continue;
            }

            let path = dir.join(format!("{stem}.{}", stream.extension()));
            tracing::debug!(track_id = job.track.id, quality = tier.as_api_str(), path = %path.display(), "Fetching stream");
            let response = self.client.get(&stream.url).send().await?.error_for_status()?;

            let part = part_path(&path);
            let written = write_response(&part, response).await;
            commit_part(&part, &path, written).await?;
            return Ok(path);
        }

        Err(DownloadError::Unavailable {
            track_id: job.track.id,
            reason: last_reason,
        })
    }

    async fn download_video(
        &self,
        job: &DownloadJob,
        dir: &Path,
        stem: &str,
    ) -> std::result::Result<PathBuf, DownloadError> {
        let master = match self.catalog.video_stream_url(&job.session, job.track.id).await {
            Ok(master) => master,
            Err(e @ (CatalogError::NotFound { .. } | CatalogError::RegionLocked { .. })) => {
                return Err(DownloadError::Unavailable {
                    track_id: job.track.id,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let master_url = parse_url(&master.url)?;
        let master_body = self.client.get(master_url.clone()).send().await?.error_for_status()?.text().await?;
        let variant_url = best_variant(&master_url, &master_body)?;

        let variant_body = self.client.get(variant_url.clone()).send().await?.error_for_status()?.text().await?;
        let segments = segment_urls(&variant_url, &variant_body)?;
        if segments.is_empty() {
            return Err(DownloadError::InvalidManifest("variant playlist has no segments".to_string()));
        }

        let path = dir.join(format!("{stem}.ts"));
        let part = part_path(&path);
        let written = self.write_segments(&part, segments).await;
        commit_part(&part, &path, written).await?;
        Ok(path)
    }

    async fn write_segments(&self, part: &Path, segments: Vec<Url>) -> std::result::Result<(), DownloadError> {
        let mut file = create_file(part).await?;
        for segment in segments {
            let bytes = self.client.get(segment).send().await?.error_for_status()?.bytes().await?;
            file.write_all(&bytes).await.map_err(|e| write_error(part, e))?;
        }
        file.flush().await.map_err(|e| write_error(part, e))
    }
}

#[async_trait::async_trait]
impl DownloadBackend for HttpDownloadBackend {
    async fn existing(&self, job: &DownloadJob) -> Option<DownloadOutcome> {
        find_existing_artifact(&job.target_dir(), &job.file_stem())
            .await
            .map(DownloadOutcome::present)
    }

    async fn download(&self, job: &DownloadJob) -> std::result::Result<DownloadOutcome, DownloadError> {
        if !job.overwrite {
            if let Some(outcome) = self.existing(job).await {
                return Ok(outcome);
            }
        }

        let dir = job.target_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| write_error(&dir, e))?;
        let stem = job.file_stem();

        let file = if job.track.is_video() {
            self.download_video(job, &dir, &stem).await?
        } else {
            self.download_audio(job, &dir, &stem).await?
        };

        tracing::info!(track_id = job.track.id, path = %file.display(), "Download finished");
        Ok(DownloadOutcome {
            location: dir,
            file,
            already_present: false,
        })
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn write_error(path: &Path, source: std::io::Error) -> DownloadError {
    DownloadError::Write {
        path: path.to_path_buf(),
        source,
    }
}

async fn create_file(path: &Path) -> std::result::Result<tokio::fs::File, DownloadError> {
    tokio::fs::File::create(path)
        .await
        .map_err(|e| write_error(path, e))
}

async fn write_response(part: &Path, mut response: reqwest::Response) -> std::result::Result<(), DownloadError> {
    let mut file = create_file(part).await?;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(|e| write_error(part, e))?;
    }
    file.flush().await.map_err(|e| write_error(part, e))
}

/// Move a fully written `.part` into place, or remove it when writing failed
async fn commit_part(
    part: &Path,
    path: &Path,
    written: std::result::Result<(), DownloadError>,
) -> std::result::Result<(), DownloadError> {
    let result = match written {
        Ok(()) => tokio::fs::rename(part, path)
            .await
            .map_err(|e| write_error(path, e)),
        Err(e) => Err(e),
    };
    if result.is_err() {
        tracing::debug!(path = %part.display(), "Discarding partial download");
        tokio::fs::remove_file(part).await.ok();
    }
    result
}

fn parse_url(raw: &str) -> std::result::Result<Url, DownloadError> {
    Url::parse(raw).map_err(|e| DownloadError::InvalidManifest(format!("bad URL {raw}: {e}")))
}

fn join_url(base: &Url, reference: &str) -> std::result::Result<Url, DownloadError> {
    base.join(reference)
        .map_err(|e| DownloadError::InvalidManifest(format!("bad URI {reference}: {e}")))
}

/// Highest-bandwidth variant of an HLS master playlist
fn best_variant(base: &Url, master: &str) -> std::result::Result<Url, DownloadError> {
    let mut best: Option<(u64, &str)> = None;
    let mut lines = master.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(attributes) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
            continue;
        };
        let bandwidth = attributes
            .split(',')
            .find_map(|attr| attr.strip_prefix("BANDWIDTH="))
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let Some(uri) = lines.find(|l| !l.is_empty() && !l.starts_with('#')) else {
            break;
        };
        if best.is_none_or(|(current, _)| bandwidth > current) {
            best = Some((bandwidth, uri));
        }
    }

    let (_, uri) = best.ok_or_else(|| DownloadError::InvalidManifest("master playlist has no variants".to_string()))?;
    join_url(base, uri)
}

/// Segment URLs of an HLS media playlist, in order
fn segment_urls(base: &Url, playlist: &str) -> std::result::Result<Vec<Url>, DownloadError> {
    playlist
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|uri| join_url(base, uri))
        .collect()
}
