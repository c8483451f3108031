//! Region failover: retrying an operation through other regional sessions
//!
//! A [`RegionFailover`] holds the session currently used for catalog and stream
//! requests plus an optional [`RotationCursor`]. When an operation fails with an
//! error whose [`IsRetryable::is_retryable`] is true, the next session is pulled
//! from the cursor, becomes the active session, and the same operation runs again.
//! Exhausting the cursor ends the loop with [`FailoverError::Exhausted`].
//!
//! The cursor is created lazily on the first retryable failure and is only
//! replaced when the caller asks for it with [`RegionFailover::restart`].
//!
//! # Example
//!
//! ```no_run
//! use tidal_relay::retry::RegionFailover;
//! use tidal_relay::session::{Session, SessionRotator};
//! # use tidal_relay::catalog::CatalogClient;
//!
//! # async fn example(catalog: &dyn CatalogClient) -> Result<(), Box<dyn std::error::Error>> {
//! let rotator = SessionRotator::new(vec![Session::new("US", "US", "token")]);
//! let mut failover = RegionFailover::new(&rotator, Session::new("TV", "GB", "token"), true);
//!
//! let album = failover
//!     .run(|session| async move { catalog.get_album(&session, "42").await })
//!     .await
//!     .map_err(|e| e.into_inner())?;
//! # Ok(())
//! # }
//! ```

use crate::error::{CatalogError, DownloadError, Error};
use crate::session::{RotationCursor, Session, SessionRotator};
use crate::types::{Event, Phase};
use std::future::Future;
use tokio::sync::broadcast;

/// Trait for errors that can be classified as recoverable through another region
///
/// Region-locked lookups and unavailable streams should return `true`.
/// Authentication, transport and decoding failures should return `false`.
pub trait IsRetryable {
    /// Returns true if the operation may succeed with a different regional session
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for CatalogError {
    fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::RegionLocked { .. })
    }
}

impl IsRetryable for DownloadError {
    fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Unavailable { .. } => true,
            DownloadError::Catalog(e) => e.is_retryable(),
            DownloadError::Network(_)
            | DownloadError::InvalidManifest(_)
            | DownloadError::Write { .. } => false,
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Catalog(e) => e.is_retryable(),
            Error::Download(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Why a failover-wrapped operation gave up
#[derive(Debug)]
pub enum FailoverError<E> {
    /// Every session in the rotation failed; carries the last error
    Exhausted(E),
    /// A non-retryable error (or failover disabled); carries the error as-is
    Failed(E),
}

impl<E> FailoverError<E> {
    /// The underlying error
    pub fn into_inner(self) -> E {
        match self {
            FailoverError::Exhausted(e) | FailoverError::Failed(e) => e,
        }
    }
}

/// Active session plus the rotation used to replace it on region-locked failures
pub struct RegionFailover<'a> {
    rotator: &'a SessionRotator,
    active: Session,
    cursor: Option<RotationCursor>,
    enabled: bool,
    phase: Phase,
    events: Option<broadcast::Sender<Event>>,
}

impl<'a> RegionFailover<'a> {
    /// Create a scope starting with `active`; `enabled = false` disables rotation entirely
    pub fn new(rotator: &'a SessionRotator, active: Session, enabled: bool) -> Self {
        Self {
            rotator,
            active,
            cursor: None,
            enabled,
            phase: Phase::Resolve,
            events: None,
        }
    }

    /// Emit [`Event::SessionRotated`] on this channel
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Session used for the next attempt
    pub fn active(&self) -> &Session {
        &self.active
    }

    /// Label rotations with `phase` from now on
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Discard the current cursor; the next retryable failure starts a fresh rotation
    pub fn restart(&mut self) {
        self.cursor = None;
    }

    /// Run `operation` with the active session, rotating sessions on retryable errors.
    ///
    /// The operation receives an owned clone of the session for each attempt.
    pub async fn run<T, E, F, Fut>(&mut self, mut operation: F) -> Result<T, FailoverError<E>>
    where
        F: FnMut(Session) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: IsRetryable + std::fmt::Display,
    {
        loop {
            match operation(self.active.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if self.enabled && e.is_retryable() => {
                    let rotator = self.rotator;
                    let cursor = self.cursor.get_or_insert_with(|| rotator.begin_rotation());
                    let Some(next) = cursor.next() else {
                        tracing::warn!(
                            error = %e,
                            phase = ?self.phase,
                            "All regional sessions failed"
                        );
                        return Err(FailoverError::Exhausted(e));
                    };

                    tracing::info!(
                        session = %next.name,
                        region = %next.country_code,
                        phase = ?self.phase,
                        error = %e,
                        "Retrying with a different regional session"
                    );
                    if let Some(tx) = &self.events {
                        tx.send(Event::SessionRotated {
                            session: next.name.clone(),
                            country_code: next.country_code.clone(),
                            phase: self.phase,
                        })
                        .ok();
                    }
                    self.active = next;
                }
                Err(e) => return Err(FailoverError::Failed(e)),
            }
        }
    }
}
