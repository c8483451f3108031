use super::*;
use crate::downloader::test_helpers::{MockBackend, MockCatalog, MockSessionStore, album, track};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::path::PathBuf;
use std::time::Duration;
use tower::ServiceExt;

mod system;

struct TestApp {
    downloader: Arc<MediaDownloader>,
    catalog: Arc<MockCatalog>,
    backend: Arc<MockBackend>,
}

fn test_app() -> TestApp {
    let mut config = Config::default();
    config.download.download_dir = PathBuf::from("/music");

    let catalog = Arc::new(MockCatalog::new());
    let backend = Arc::new(MockBackend::new());
    let downloader = Arc::new(MediaDownloader::with_components(
        config,
        Arc::new(MockSessionStore::new("TV", &[])),
        catalog.clone(),
        backend.clone(),
    ));
    TestApp {
        downloader,
        catalog,
        backend,
    }
}

impl TestApp {
    fn router(&self) -> Router {
        self.router_with(|_| {})
    }

    fn router_with(&self, tweak: impl FnOnce(&mut Config)) -> Router {
        let mut config = (*self.downloader.get_config()).clone();
        tweak(&mut config);
        create_router(self.downloader.clone(), Arc::new(config))
    }
}

async fn get(router: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn api_server_spawns_and_binds() {
    let app = test_app();
    let mut config = (*app.downloader.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let handle = tokio::spawn(start_api_server(app.downloader.clone(), Arc::new(config)));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!handle.is_finished(), "server should still be running");
    handle.abort();
}

#[tokio::test]
async fn cors_headers_present_when_enabled() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn cors_headers_absent_when_disabled() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app
        .router_with(|c| c.api.cors_enabled = false)
        .oneshot(request)
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn api_key_guards_every_route() {
    let app = test_app();
    let router = app.router_with(|c| c.api.api_key = Some("s3cret".to_string()));

    let denied = get(router.clone(), "/health").await;
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/health")
        .header("X-Api-Key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let allowed = router.oneshot(request).await.unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn swagger_ui_can_be_disabled() {
    let app = test_app();

    let enabled = get(app.router(), "/swagger-ui/").await;
    assert_ne!(enabled.status(), StatusCode::NOT_FOUND);

    let disabled = get(app.router_with(|c| c.api.swagger_ui = false), "/swagger-ui/").await;
    assert_eq!(disabled.status(), StatusCode::NOT_FOUND);
}
