//! Processing identifiers end to end: classify, resolve, download

use super::MediaDownloader;
use crate::downloader::orchestrator::OrchestrationReport;
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::retry::RegionFailover;
use crate::session::SessionRotator;
use crate::types::{BatchReport, EntryOutcome, EntryReport, Event, MediaKind};
use std::path::PathBuf;

/// A classified identifier ready to be processed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRequest {
    /// Parsed identifier
    pub identifier: Identifier,
    /// Kind it was classified as
    pub kind: MediaKind,
}

impl MediaDownloader {
    /// Classify `raw` and download everything it names
    ///
    /// Unlike [`process_batch`](Self::process_batch), failures of the single entry are
    /// returned as errors: an identifier no session can resolve yields
    /// [`Error::NotResolvable`]. A resolvable identifier whose items all fail yields a
    /// report with an empty location.
    pub async fn download_identifier(&self, raw: &str) -> Result<BatchReport> {
        let request = self.classify(raw).await?;
        let rotator = self.load_rotator().await?;

        let summary = self.process_request(&rotator, &request).await?;
        let report = BatchReport {
            location: summary.location.clone(),
            entries: vec![EntryReport {
                id: request.identifier.id().to_string(),
                kind: request.kind,
                outcome: processed(summary),
            }],
        };
        self.emit_event(Event::BatchComplete {
            location: report.location.clone(),
        });
        Ok(report)
    }

    /// Process classified requests in order
    ///
    /// The session pool is loaded once for the whole batch. An entry no session can
    /// resolve is skipped; an entry that fails for any other reason is recorded as
    /// failed. Neither stops the remaining entries.
    pub async fn process_batch(&self, requests: Vec<MediaRequest>) -> Result<BatchReport> {
        let rotator = self.load_rotator().await?;
        let mut report = BatchReport::default();

        for request in requests {
            let id = request.identifier.id().to_string();
            let outcome = match self.process_request(&rotator, &request).await {
                Ok(summary) => {
                    if summary.location.is_some() {
                        report.location = summary.location.clone();
                    }
                    processed(summary)
                }
                Err(Error::NotResolvable { .. }) => EntryOutcome::Skipped,
                Err(e) => {
                    tracing::error!(id = %id, kind = %request.kind, error = %e, "Batch entry failed");
                    EntryOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.entries.push(EntryReport {
                id,
                kind: request.kind,
                outcome,
            });
        }

        tracing::info!(
            entries = report.entries.len(),
            location = %report.directory(),
            "Batch complete"
        );
        self.emit_event(Event::BatchComplete {
            location: report.location.clone(),
        });
        Ok(report)
    }

    async fn load_rotator(&self) -> Result<SessionRotator> {
        let pool = self.sessions.regional_sessions().await?;
        tracing::debug!(sessions = pool.len(), "Loaded regional session pool");
        Ok(SessionRotator::new(pool))
    }

    /// Resolve then download one request with a fresh default session
    async fn process_request(
        &self,
        rotator: &SessionRotator,
        request: &MediaRequest,
    ) -> Result<OrchestrationReport> {
        let session = self
            .sessions
            .load_session(&self.config.sessions.default_session)
            .await?;
        let mut failover = RegionFailover::new(rotator, session, self.config.download.region_failover)
            .with_events(self.event_tx.clone());

        let resolved = match self
            .resolver()
            .resolve(&mut failover, &request.identifier, request.kind)
            .await
        {
            Ok(resolved) => resolved,
            Err(e @ Error::NotResolvable { .. }) => {
                tracing::warn!(id = %request.identifier, error = %e, "Skipping identifier");
                self.emit_event(Event::IdentifierSkipped {
                    id: request.identifier.id().to_string(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let output_dir: PathBuf = match &resolved.subdirectory {
            Some(subdirectory) => self.config.download.download_dir.join(subdirectory),
            None => self.config.download.download_dir.clone(),
        };

        Ok(self
            .orchestrator()
            .run(
                &resolved.items,
                resolved.kind,
                &mut failover,
                self.config.download.overwrite,
                &output_dir,
            )
            .await)
    }
}

fn processed(summary: OrchestrationReport) -> EntryOutcome {
    EntryOutcome::Processed {
        completed: summary.completed,
        failed: summary.failed,
        location: summary.location,
    }
}
