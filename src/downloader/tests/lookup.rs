use super::*;
use crate::catalog::{Page, SearchResults};
use crate::error::CatalogError;
use crate::search::{SearchKind, SearchResponse};

#[tokio::test]
async fn numeric_id_is_looked_up_with_default_session() {
    let h = harness(&["A"]);
    h.catalog.add_track(track(7, "Song"));

    let request = h.downloader.classify("7").await.unwrap();

    assert_eq!(request.kind, MediaKind::Track);
    assert_eq!(h.catalog.sessions_for("get_album", "7"), vec!["TV"]);
    assert_eq!(h.catalog.sessions_for("get_artist", "7"), vec!["TV"]);
}

#[tokio::test]
async fn url_kind_needs_no_catalog_lookup() {
    let h = harness(&[]);

    let request = h
        .downloader
        .classify("https://listen.tidal.com/artist/42")
        .await
        .unwrap();

    assert_eq!(request.kind, MediaKind::Artist);
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn garbage_is_an_invalid_identifier() {
    let h = harness(&[]);
    let err = h.downloader.classify("not an id").await.unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier(_)));
}

#[tokio::test]
async fn unknown_playlist_is_not_found() {
    let h = harness(&[]);
    let err = h
        .downloader
        .classify("0c5a1b2c-3d4e-4f50-9a6b-7c8d9e0f1a2b")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Catalog(CatalogError::NotFound { .. })));
}

#[tokio::test]
async fn file_identifier_classifies_as_file() {
    let h = harness(&[]);
    let request = h
        .downloader
        .classify_identifier(Identifier::file("1\n2\n"))
        .await
        .unwrap();
    assert_eq!(request.kind, MediaKind::File);
}

#[tokio::test]
async fn search_ranks_catalog_results() {
    let h = harness(&[]);
    h.catalog.set_search_results(SearchResults {
        tracks: Page::from_items(vec![track(1, "Hit")]),
        ..SearchResults::default()
    });

    let response = h.downloader.search("hit", SearchKind::Track).await.unwrap();

    let SearchResponse::Media { others, .. } = response else {
        panic!("expected media response");
    };
    assert_eq!(others[0].title, "Hit");
    assert_eq!(h.catalog.sessions_for("search", "hit"), vec!["TV"]);
}

#[tokio::test]
async fn blank_search_query_is_rejected() {
    let h = harness(&[]);
    assert!(h.downloader.search("  ", SearchKind::Album).await.is_err());
}
