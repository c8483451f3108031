use super::*;
use crate::api::routes::BANNER;
use crate::types::Event;

#[tokio::test]
async fn root_serves_banner() {
    let app = test_app();

    let response = get(app.router(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], BANNER.as_bytes());
}

#[tokio::test]
async fn health_reports_version() {
    let app = test_app();

    let body = json_body(get(app.router(), "/health").await).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_json_is_served() {
    let app = test_app();

    let body = json_body(get(app.router(), "/openapi.json").await).await;

    assert_eq!(body["info"]["title"], "tidal-relay REST API");
    assert!(body["paths"]["/search"].is_object());
}

#[tokio::test]
async fn event_stream_forwards_named_events() {
    let app = test_app();

    let response = get(app.router(), "/events").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("text/event-stream"));

    app.downloader.emit_event(Event::BatchComplete { location: None });

    let mut body = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(2), async {
        use tokio_stream::StreamExt;
        body.next().await
    })
    .await
    .expect("event should arrive")
    .expect("stream should stay open")
    .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();

    assert!(text.contains("event: batch_complete"));
    assert!(text.contains(r#""type":"batch_complete""#));
}
