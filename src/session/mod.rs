//! Authenticated regional sessions and the rotation used for region failover.
//!
//! - [`Session`] - an opaque authenticated handle bound to a country code
//! - [`SessionStore`] - loads the default session and the regional pool
//! - [`SessionRotator`] - hands out independent, finite [`RotationCursor`]s over the pool

mod file;

pub use file::JsonSessionStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authenticated catalog session for one region
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Name the session is stored under (e.g. "TV", "US")
    pub name: String,
    /// Two-letter country code the session is bound to
    pub country_code: String,
    /// Bearer token
    pub access_token: String,
    /// Account id, when known
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl Session {
    /// Create a session
    pub fn new(
        name: impl Into<String>,
        country_code: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country_code: country_code.into(),
            access_token: access_token.into(),
            user_id: None,
        }
    }
}

// Tokens must never reach logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("country_code", &self.country_code)
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Source of persisted sessions (read-only to the core)
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by name
    async fn load_session(&self, name: &str) -> Result<Session>;

    /// Every stored session, in stored order
    async fn regional_sessions(&self) -> Result<Vec<Session>>;
}

/// Owns a request's session pool and starts rotations over it.
///
/// Every call to [`begin_rotation`](Self::begin_rotation) returns a cursor positioned
/// at the first session, independent of any other cursor.
#[derive(Clone, Debug)]
pub struct SessionRotator {
    pool: Arc<[Session]>,
}

impl SessionRotator {
    /// Create a rotator over a fixed pool
    pub fn new(pool: Vec<Session>) -> Self {
        Self { pool: pool.into() }
    }

    /// Start a fresh rotation at the first session
    pub fn begin_rotation(&self) -> RotationCursor {
        RotationCursor {
            pool: Arc::clone(&self.pool),
            position: 0,
        }
    }

    /// Number of sessions in the pool
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// True when the pool holds no session
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

/// Position within one rotation. Yields each pooled session once, then `None` forever.
#[derive(Clone, Debug)]
pub struct RotationCursor {
    pool: Arc<[Session]>,
    position: usize,
}

impl RotationCursor {
    /// Sessions not yet handed out
    pub fn remaining(&self) -> usize {
        self.pool.len().saturating_sub(self.position)
    }
}

impl Iterator for RotationCursor {
    type Item = Session;

    fn next(&mut self) -> Option<Session> {
        let session = self.pool.get(self.position)?.clone();
        self.position += 1;
        Some(session)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl std::iter::FusedIterator for RotationCursor {}
