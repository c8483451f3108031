//! Classification and search entry points

use super::MediaDownloader;
use super::batch::MediaRequest;
use crate::error::{Error, Result};
use crate::identifier::{self, Identifier};
use crate::search::{self, SEARCH_LIMIT, SearchKind, SearchResponse};

impl MediaDownloader {
    /// Parse and classify a raw identifier using the default session
    ///
    /// Numeric ids are looked up in the catalog; playlist UUIDs are confirmed to exist.
    pub async fn classify(&self, raw: &str) -> Result<MediaRequest> {
        let identifier = Identifier::parse(raw)?;
        self.classify_identifier(identifier).await
    }

    /// Classify an already parsed identifier, e.g. [`Identifier::file`]
    pub async fn classify_identifier(&self, identifier: Identifier) -> Result<MediaRequest> {
        let session = self
            .sessions
            .load_session(&self.config.sessions.default_session)
            .await?;
        let kind = identifier::classify(self.catalog.as_ref(), &session, &identifier).await?;
        tracing::debug!(id = %identifier, %kind, "Identifier classified");
        Ok(MediaRequest { identifier, kind })
    }

    /// Search the catalog and shape the top hits
    pub async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidIdentifier("search query is empty".to_string()));
        }

        let session = self
            .sessions
            .load_session(&self.config.sessions.default_session)
            .await?;
        let results = self.catalog.search(&session, query, SEARCH_LIMIT).await?;
        Ok(search::rank(results, kind))
    }
}
