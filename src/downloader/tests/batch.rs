use super::*;
use crate::types::Event;

#[tokio::test]
async fn unresolvable_entry_is_skipped_and_batch_continues() {
    let h = harness(&["A", "B"]);
    add_album(&h.catalog, 10, "Locked", &[1]);
    add_album(&h.catalog, 11, "Open", &[2, 3]);
    h.catalog.lock_region("10", &[]);
    let mut events = h.downloader.subscribe();

    let report = h
        .downloader
        .process_batch(vec![
            request(MediaKind::Album, "10"),
            request(MediaKind::Album, "11"),
        ])
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].outcome, EntryOutcome::Skipped);
    assert!(matches!(
        report.entries[1].outcome,
        EntryOutcome::Processed { completed: 2, failed: 0, .. }
    ));
    assert_eq!(report.location, Some(PathBuf::from("/music/Artist - Open")));
    assert_eq!(h.catalog.sessions_for("get_album", "10"), vec!["TV", "A", "B"]);

    let mut skipped = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::IdentifierSkipped { id, .. } = event {
            skipped.push(id);
        }
    }
    assert_eq!(skipped, vec!["10"]);
}

#[tokio::test]
async fn file_whose_lines_are_locked_everywhere_is_skipped() {
    let h = harness(&["A", "B"]);
    h.catalog.add_track(track(1, "Nowhere"));
    h.catalog.lock_region("1", &[]);
    let mut events = h.downloader.subscribe();

    let report = h
        .downloader
        .process_batch(vec![MediaRequest {
            identifier: Identifier::file("1\n"),
            kind: MediaKind::File,
        }])
        .await
        .unwrap();

    assert_eq!(report.entries[0].outcome, EntryOutcome::Skipped);
    assert!(h.backend.calls().is_empty());
    let mut skipped = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::IdentifierSkipped { id, .. } = event {
            skipped.push(id);
        }
    }
    assert_eq!(skipped, vec!["<file>"]);
}

#[tokio::test]
async fn non_retryable_failure_only_fails_its_entry() {
    let h = harness(&["A"]);
    add_album(&h.catalog, 10, "Denied", &[1]);
    add_album(&h.catalog, 11, "Open", &[2]);
    h.catalog.deny("10");

    let report = h
        .downloader
        .process_batch(vec![
            request(MediaKind::Album, "10"),
            request(MediaKind::Album, "11"),
        ])
        .await
        .unwrap();

    assert!(matches!(report.entries[0].outcome, EntryOutcome::Failed { .. }));
    assert!(matches!(report.entries[1].outcome, EntryOutcome::Processed { .. }));
    assert_eq!(h.catalog.sessions_for("get_album", "10"), vec!["TV"]);
}

#[tokio::test]
async fn location_comes_from_the_last_successful_entry() {
    let h = harness(&[]);
    add_album(&h.catalog, 10, "First", &[1]);
    add_album(&h.catalog, 11, "Broken", &[2]);
    h.backend.break_track(2);

    let report = h
        .downloader
        .process_batch(vec![
            request(MediaKind::Album, "10"),
            request(MediaKind::Album, "11"),
        ])
        .await
        .unwrap();

    assert_eq!(report.directory(), "/music/Artist - First");
    assert!(matches!(
        report.entries[1].outcome,
        EntryOutcome::Processed { completed: 0, failed: 1, location: None }
    ));
}

#[tokio::test]
async fn session_found_during_resolution_is_used_for_downloads() {
    let h = harness(&["A", "B"]);
    add_album(&h.catalog, 10, "Record", &[1, 2]);
    h.catalog.lock_region("10", &["B"]);

    h.downloader
        .process_batch(vec![request(MediaKind::Album, "10")])
        .await
        .unwrap();

    let sessions: Vec<String> = h.backend.calls().into_iter().map(|c| c.session).collect();
    assert_eq!(sessions, vec!["B", "B"]);
}

#[tokio::test]
async fn each_entry_starts_from_the_default_session() {
    let h = harness(&["A", "B"]);
    add_album(&h.catalog, 10, "Record", &[1]);
    add_album(&h.catalog, 11, "Other", &[2]);
    h.catalog.lock_region("10", &["B"]);

    h.downloader
        .process_batch(vec![
            request(MediaKind::Album, "10"),
            request(MediaKind::Album, "11"),
        ])
        .await
        .unwrap();

    assert_eq!(h.catalog.sessions_for("get_album", "11"), vec!["TV"]);
}

#[tokio::test]
async fn download_identifier_classifies_and_downloads_album() {
    let h = harness(&[]);
    add_album(&h.catalog, 10, "Record", &[1, 2]);

    let report = h.downloader.download_identifier("10").await.unwrap();

    assert_eq!(report.directory(), "/music/Artist - Record");
    assert_eq!(report.entries[0].kind, MediaKind::Album);
    assert_eq!(h.backend.calls().len(), 2);
}

#[tokio::test]
async fn download_identifier_puts_playlists_in_their_own_directory() {
    let h = harness(&[]);
    let uuid = "0c5a1b2c-3d4e-4f50-9a6b-7c8d9e0f1a2b";
    h.catalog.add_playlist(
        playlist(uuid, "Mix", 5, "Alice"),
        vec![track(1, "One"), track(2, "Two")],
    );

    let report = h.downloader.download_identifier(uuid).await.unwrap();

    assert_eq!(report.directory(), "/music/Alice - Mix");
    let numbers: Vec<Option<u32>> = h.backend.calls().iter().map(|c| c.track_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn download_identifier_reports_unresolvable() {
    let h = harness(&["A"]);
    add_album(&h.catalog, 10, "Record", &[1]);
    h.catalog.lock_region("10", &[]);

    let err = h
        .downloader
        .download_identifier("https://tidal.com/browse/album/10")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotResolvable { .. }));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn download_identifier_with_no_successful_item_has_empty_directory() {
    let h = harness(&[]);
    h.catalog.add_track(track(1, "Song"));
    h.backend.break_track(1);

    let report = h
        .downloader
        .download_identifier("https://tidal.com/browse/track/1")
        .await
        .unwrap();

    assert_eq!(report.directory(), "");
}

#[tokio::test]
async fn rerun_reports_existing_output_without_downloading_again() {
    let h = harness(&[]);
    add_album(&h.catalog, 10, "Record", &[1, 2]);

    let first = h.downloader.download_identifier("10").await.unwrap();
    let second = h.downloader.download_identifier("10").await.unwrap();

    assert_eq!(h.backend.calls().len(), 2);
    assert_eq!(second.location, first.location);
}

#[tokio::test]
async fn batch_complete_event_carries_location() {
    let h = harness(&[]);
    add_album(&h.catalog, 10, "Record", &[1]);
    let mut events = h.downloader.subscribe();

    h.downloader
        .process_batch(vec![request(MediaKind::Album, "10")])
        .await
        .unwrap();

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    match last {
        Some(Event::BatchComplete { location }) => {
            assert_eq!(location, Some(PathBuf::from("/music/Artist - Record")));
        }
        other => panic!("expected batch_complete last, got {other:?}"),
    }
}
