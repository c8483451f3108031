//! Catalog search

use crate::api::AppState;
use crate::error::ApiError;
use crate::search::{SearchKind, SearchResponse};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query string of `GET /search`
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free-text query
    pub q: Option<String>,
    /// `track`, `album` or `artist`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// GET /search - Search tracks, albums or artists
#[utoipa::path(
    get,
    path = "/search",
    tag = "media",
    params(SearchQuery),
    responses(
        (status = 200, description = "Ranked hits", body = SearchResponse),
        (status = 400, description = "Missing query or unknown type", body = ApiError)
    )
)]
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return ApiError::validation("Query parameter 'q' is required").into_response();
    };

    let kind = match query.kind.as_deref().map(str::parse::<SearchKind>) {
        Some(Ok(kind)) => kind,
        Some(Err(message)) => return ApiError::validation(message).into_response(),
        None => {
            return ApiError::validation("Query parameter 'type' is required").into_response();
        }
    };

    match state.downloader.search(&q, kind).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}
