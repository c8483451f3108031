//! OpenAPI documentation and schema generation
//!
//! The specification is generated at compile time with utoipa and served at
//! `/openapi.json`; Swagger UI at `/swagger-ui` reads from it when enabled.

use utoipa::OpenApi;

/// OpenAPI documentation for the tidal-relay REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tidal-relay REST API",
        version = "0.1.0",
        description = "Resolve catalog identifiers into tracks and download them, rotating regional sessions when content is region-locked",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local server")
    ),
    paths(
        // Media
        crate::api::routes::download_media,
        crate::api::routes::search,

        // System
        crate::api::routes::banner,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::MediaKind,
        crate::types::QualityTier,
        crate::types::AlbumType,
        crate::types::AlbumContext,
        crate::types::Phase,
        crate::types::AlbumSkipReason,
        crate::types::Event,
        crate::types::EntryOutcome,
        crate::types::EntryReport,
        crate::types::BatchReport,

        // Catalog records
        crate::catalog::models::ArtistRef,
        crate::catalog::models::AlbumRef,
        crate::catalog::models::Track,
        crate::catalog::models::Album,
        crate::catalog::models::Artist,

        // Search
        crate::search::SearchKind,
        crate::search::SearchItem,
        crate::search::SearchHit,
        crate::search::SearchResponse,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::SessionConfig,
        crate::config::CatalogConfig,
        crate::config::Preset,
        crate::config::ApiConfig,

        // API response types
        crate::api::routes::DirectoryResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Resolve and download identifiers, search the catalog"),
        (name = "system", description = "System endpoints - Banner, health, OpenAPI spec, events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add API key authentication scheme to OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
