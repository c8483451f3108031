//! REST API server example
//!
//! Runs tidal-relay with the REST API enabled. Sessions are read from
//! `config/sessions.json` (see `JsonSessionStore` for the layout).
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:5000/swagger-ui
//! - Download via GET http://localhost:5000/id/<id or URL>
//! - Search via GET http://localhost:5000/search?q=<query>&type=track
//! - Stream events via GET http://localhost:5000/events

use std::sync::Arc;
use tidal_relay::api::start_api_server;
use tidal_relay::config::{Config, DownloadConfig};
use tidal_relay::MediaDownloader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tidal_relay=info")),
        )
        .init();

    let mut config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    config.api.bind_address = "127.0.0.1:5000".parse()?;

    let downloader = Arc::new(MediaDownloader::new(config.clone()).await?);
    let config = Arc::new(config);

    println!("Swagger UI: http://localhost:5000/swagger-ui");
    println!("Events:     http://localhost:5000/events");
    println!();
    println!("Example commands:");
    println!("  curl http://localhost:5000/id/https%3A%2F%2Ftidal.com%2Fbrowse%2Falbum%2F1234");
    println!("  curl 'http://localhost:5000/search?q=daft+punk&type=album'");

    // Stops on Ctrl+C or SIGTERM
    start_api_server(downloader, config).await?;

    Ok(())
}
