//! Error types for tidal-relay
//!
//! This module provides the error taxonomy for the library:
//! - [`CatalogError`] - classified failures from the remote catalog
//! - [`DownloadError`] - classified failures from the download backend
//! - [`Error`] - the top-level error returned by the public API
//! - HTTP status code mapping and structured [`ApiError`] bodies for the REST layer
//!
//! Classification into "another regional session may succeed" versus everything else
//! happens once, where the collaborator produces the error. Callers match on variants,
//! never on message text.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for tidal-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tidal-relay
#[derive(Debug, Error)]
pub enum Error {
    /// The raw identifier could not be classified into a media kind
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "preset.flac_16")
        key: Option<String>,
    },

    /// Catalog lookup failed with a non-recoverable error
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Download backend failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Every regional session was tried and none could resolve the identifier
    #[error("{id} could not be resolved with any available session")]
    NotResolvable {
        /// The identifier that was abandoned
        id: String,
    },

    /// Session store could not provide the requested session(s)
    #[error("session error: {0}")]
    Session(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised by a [`CatalogClient`](crate::catalog::CatalogClient)
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Resource absent for the session's region, another region may have it
    #[error("{resource} {id} not found, it might be region-locked")]
    RegionLocked {
        /// Resource type ("track", "album", ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Resource does not exist
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource type ("track", "album", ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Session rejected by the catalog (expired or insufficient subscription)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unexpected HTTP status from the catalog
    #[error("catalog returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Transport failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed response body
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised by a [`DownloadBackend`](crate::downloader::DownloadBackend)
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No requested quality tier produced a usable stream for this session
    #[error("unable to download track {track_id}: {reason}")]
    Unavailable {
        /// The track or video that could not be fetched
        track_id: u64,
        /// Why the last tier was rejected
        reason: String,
    },

    /// Catalog failure while preparing the stream
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Stream transfer failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Stream manifest could not be interpreted
    #[error("invalid stream manifest: {0}")]
    InvalidManifest(String),

    /// Writing the artifact failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// The artifact path being written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_identifier",
///     "message": "invalid identifier: abc"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::InvalidIdentifier(_) => 400,
            Error::Config { .. } => 400,

            Error::NotResolvable { .. } => 404,
            Error::Catalog(CatalogError::NotFound { .. }) => 404,
            Error::Catalog(CatalogError::RegionLocked { .. }) => 404,

            // Upstream catalog misbehaved
            Error::Catalog(_) => 502,
            Error::Download(DownloadError::Write { .. }) => 500,
            Error::Download(_) => 502,

            Error::Session(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidIdentifier(_) => "invalid_identifier",
            Error::Config { .. } => "config_error",
            Error::Catalog(e) => match e {
                CatalogError::RegionLocked { .. } => "region_locked",
                CatalogError::NotFound { .. } => "not_found",
                CatalogError::Unauthorized(_) => "catalog_unauthorized",
                CatalogError::Http { .. } => "catalog_http_error",
                CatalogError::Network(_) => "network_error",
                CatalogError::Decode(_) => "catalog_decode_error",
            },
            Error::Download(e) => match e {
                DownloadError::Unavailable { .. } => "download_unavailable",
                DownloadError::Catalog(_) => "catalog_error",
                DownloadError::Network(_) => "network_error",
                DownloadError::InvalidManifest(_) => "invalid_manifest",
                DownloadError::Write { .. } => "write_failed",
            },
            Error::NotResolvable { .. } => "not_resolvable",
            Error::Session(_) => "session_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::NotResolvable { id } => Some(serde_json::json!({ "id": id })),
            Error::Catalog(
                CatalogError::NotFound { resource, id } | CatalogError::RegionLocked { resource, id },
            ) => Some(serde_json::json!({
                "resource": resource,
                "id": id,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
