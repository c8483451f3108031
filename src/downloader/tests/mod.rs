use super::test_helpers::{MockBackend, MockCatalog, MockSessionStore, album, playlist, track};
use super::*;
use crate::error::Error;
use crate::identifier::Identifier;
use crate::types::{EntryOutcome, MediaKind};
use std::path::PathBuf;

mod batch;
mod lookup;

struct Harness {
    downloader: MediaDownloader,
    catalog: Arc<MockCatalog>,
    backend: Arc<MockBackend>,
}

fn harness(pool: &[&str]) -> Harness {
    let mut config = Config::default();
    config.download.download_dir = PathBuf::from("/music");

    let catalog = Arc::new(MockCatalog::new());
    let backend = Arc::new(MockBackend::new());
    let downloader = MediaDownloader::with_components(
        config,
        Arc::new(MockSessionStore::new("TV", pool)),
        catalog.clone(),
        backend.clone(),
    );
    Harness {
        downloader,
        catalog,
        backend,
    }
}

fn add_album(catalog: &MockCatalog, id: u64, title: &str, track_ids: &[u64]) {
    let tracks = track_ids
        .iter()
        .map(|t| track(*t, &format!("Track {t}")))
        .collect();
    catalog.add_album(album(id, title, "ALBUM", track_ids.len() as u32), tracks);
}

fn request(kind: MediaKind, id: &str) -> MediaRequest {
    MediaRequest {
        identifier: Identifier::Typed {
            kind,
            id: id.to_string(),
        },
        kind,
    }
}
