//! Resolve-and-download by identifier

use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Body returned once every item of an identifier has been attempted
#[derive(Debug, Serialize, ToSchema)]
pub struct DirectoryResponse {
    /// Location of the last completed item, empty when nothing completed
    pub directory: String,
}

/// GET /id/:media_id - Classify, resolve and download an identifier
#[utoipa::path(
    get,
    path = "/id/{media_id}",
    tag = "media",
    params(
        ("media_id" = String, Path, description = "Numeric id, playlist UUID or catalog URL")
    ),
    responses(
        (status = 200, description = "Every item was attempted", body = DirectoryResponse),
        (status = 400, description = "Identifier could not be classified", body = crate::error::ApiError),
        (status = 404, description = "No session could resolve the identifier", body = crate::error::ApiError),
        (status = 502, description = "Catalog or stream failure", body = crate::error::ApiError)
    )
)]
pub async fn download_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Result<Json<DirectoryResponse>, Error> {
    tracing::info!(media_id = %media_id, "Download requested");

    let report = state.downloader.download_identifier(&media_id).await?;
    Ok(Json(DirectoryResponse {
        directory: report.directory(),
    }))
}
