//! Sequential download of resolved items with per-item region failover

use crate::downloader::backend::{DownloadBackend, DownloadJob, DownloadOutcome};
use crate::retry::{FailoverError, RegionFailover};
use crate::types::{Event, MediaKind, Phase, ResolvedItem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Summary of one orchestrator run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrchestrationReport {
    /// Items downloaded or already present
    pub completed: usize,
    /// Items abandoned
    pub failed: usize,
    /// Location reported by the last completed item
    pub location: Option<PathBuf>,
}

/// Downloads items one after another; a failed item never stops the run
#[derive(Clone)]
pub struct DownloadOrchestrator {
    backend: Arc<dyn DownloadBackend>,
    events: Option<broadcast::Sender<Event>>,
}

impl DownloadOrchestrator {
    /// Create an orchestrator over `backend`
    pub fn new(backend: Arc<dyn DownloadBackend>) -> Self {
        Self {
            backend,
            events: None,
        }
    }

    /// Report item outcomes on this channel
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Download `items` in order into `output_dir`.
    ///
    /// Each item starts a fresh rotation, so sessions consumed by one item are
    /// available again to the next. The session that last succeeded stays active.
    /// With `overwrite` off, items whose artifact already exists are reported as
    /// completed without calling [`DownloadBackend::download`].
    pub async fn run(
        &self,
        items: &[ResolvedItem],
        kind: MediaKind,
        failover: &mut RegionFailover<'_>,
        overwrite: bool,
        output_dir: &Path,
    ) -> OrchestrationReport {
        failover.set_phase(Phase::Download);
        let backend = self.backend.as_ref();
        let mut report = OrchestrationReport::default();

        for (index, item) in items.iter().enumerate() {
            failover.restart();

            let template = DownloadJob {
                session: failover.active().clone(),
                track: item.track.clone(),
                album: item.album.clone(),
                overwrite,
                // Positional numbering only makes sense for playlists
                track_number: (kind == MediaKind::Playlist).then(|| index as u32 + 1),
                output_dir: output_dir.to_path_buf(),
            };

            if !overwrite {
                if let Some(outcome) = backend.existing(&template).await {
                    tracing::debug!(track_id = item.track.id, path = %outcome.file.display(), "Already present");
                    self.completed(&mut report, item, outcome);
                    continue;
                }
            }

            let result = failover
                .run(|session| {
                    let job = DownloadJob {
                        session,
                        ..template.clone()
                    };
                    async move { backend.download(&job).await }
                })
                .await;

            match result {
                Ok(outcome) => self.completed(&mut report, item, outcome),
                Err(FailoverError::Exhausted(e)) => {
                    tracing::warn!(
                        track_id = item.track.id,
                        title = %item.track.title,
                        error = %e,
                        "Track unavailable with every regional session, skipping"
                    );
                    self.failed(&mut report, item, e.to_string());
                }
                Err(FailoverError::Failed(e)) => {
                    tracing::warn!(
                        track_id = item.track.id,
                        title = %item.track.title,
                        error = %e,
                        "Track download failed, skipping"
                    );
                    self.failed(&mut report, item, e.to_string());
                }
            }
        }

        report
    }

    fn completed(&self, report: &mut OrchestrationReport, item: &ResolvedItem, outcome: DownloadOutcome) {
        tracing::info!(
            track_id = item.track.id,
            title = %item.track.title,
            location = %outcome.location.display(),
            already_present = outcome.already_present,
            "Item completed"
        );
        report.completed += 1;
        report.location = Some(outcome.location.clone());
        self.emit(Event::ItemCompleted {
            track_id: item.track.id,
            title: item.track.title.clone(),
            location: outcome.location,
            already_present: outcome.already_present,
        });
    }

    fn failed(&self, report: &mut OrchestrationReport, item: &ResolvedItem, error: String) {
        report.failed += 1;
        self.emit(Event::ItemFailed {
            track_id: item.track.id,
            title: item.track.title.clone(),
            error,
        });
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}
