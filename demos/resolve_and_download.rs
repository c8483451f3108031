//! Resolve and download identifiers given on the command line
//!
//! ```text
//! cargo run --example resolve_and_download -- 1234567 https://tidal.com/browse/artist/42
//! ```
//!
//! Each argument is classified, resolved with region failover and downloaded;
//! an identifier no session can see is skipped.

use tidal_relay::{Config, EntryOutcome, Event, MediaDownloader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tidal_relay=info")),
        )
        .init();

    let config = match std::env::var("TIDAL_RELAY_CONFIG") {
        Ok(path) => Config::from_json_file(path)?,
        Err(_) => Config::default(),
    };
    let downloader = MediaDownloader::new(config).await?;

    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::SessionRotated {
                    session, phase, ..
                } => println!("  rotated to {session} ({phase:?})"),
                Event::AlbumSkipped { title, reason } => println!("  skipped album {title} ({reason:?})"),
                Event::ItemCompleted {
                    title,
                    already_present,
                    ..
                } => println!("  {} {title}", if already_present { "kept" } else { "saved" }),
                Event::ItemFailed { title, error, .. } => println!("  failed {title}: {error}"),
                _ => {}
            }
        }
    });

    let mut requests = Vec::new();
    for raw in std::env::args().skip(1) {
        requests.push(downloader.classify(&raw).await?);
    }

    let report = downloader.process_batch(requests).await?;
    for entry in &report.entries {
        match &entry.outcome {
            EntryOutcome::Processed {
                completed, failed, ..
            } => println!("{} {}: {completed} done, {failed} failed", entry.kind, entry.id),
            EntryOutcome::Skipped => println!("{} {}: not available in any region", entry.kind, entry.id),
            EntryOutcome::Failed { error } => println!("{} {}: {error}", entry.kind, entry.id),
        }
    }
    println!("last location: {}", report.directory());

    Ok(())
}
