//! Shared fixtures for the end-to-end tests: a wiremock catalog and a session file.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tidal_relay::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sessions written to the session file, in pool order
pub const SESSIONS: &[(&str, &str)] = &[("TV", "US"), ("GB", "GB"), ("JP", "JP")];

/// Temporary workspace holding the session file and the download directory
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sessions: Vec<Value> = SESSIONS
            .iter()
            .map(|(name, country)| {
                json!({
                    "name": name,
                    "country_code": country,
                    "access_token": format!("token-{name}"),
                })
            })
            .collect();
        std::fs::write(
            dir.path().join("sessions.json"),
            json!({ "default": "TV", "sessions": sessions }).to_string(),
        )
        .unwrap();
        Self { dir }
    }

    pub fn music_dir(&self) -> PathBuf {
        self.dir.path().join("music")
    }

    pub fn config(&self, server: &MockServer) -> Config {
        let mut config = Config::default();
        config.download.download_dir = self.music_dir();
        config.sessions.path = self.dir.path().join("sessions.json");
        config.catalog.base_url = format!("{}/", server.uri());
        config
    }
}

pub fn album_json(id: u64, title: &str, artist: &str, tracks: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "numberOfTracks": tracks,
        "type": "ALBUM",
        "audioModes": ["STEREO"],
        "artist": { "id": 1, "name": artist },
        "artists": [{ "id": 1, "name": artist }]
    })
}

pub fn track_json(id: u64, title: &str, number: u32, artist: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "trackNumber": number,
        "audioModes": ["STEREO"],
        "artists": [{ "id": 1, "name": artist }]
    })
}

pub fn page(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({ "items": items, "totalNumberOfItems": total })
}

/// Catalog error body for "exists, but not in this region"
pub fn region_locked() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "status": 404,
        "subStatus": 2001,
        "userMessage": "Asset is not available in your region"
    }))
}

/// Serve `body` at `route` for sessions in `country`
pub async fn mount_for(server: &MockServer, route: &str, country: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("countryCode", country))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Serve a FLAC stream for `track_id` to sessions in `country`, with the payload at `/media/{id}.flac`
pub async fn mount_flac(server: &MockServer, track_id: u64, country: &str, payload: &'static [u8]) {
    mount_for(
        server,
        &format!("/tracks/{track_id}/streamUrl"),
        country,
        ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/media/{track_id}.flac", server.uri()),
            "codec": "FLAC",
            "soundQuality": "LOSSLESS"
        })),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/media/{track_id}.flac")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .mount(server)
        .await;
}

/// Countries a request to `route` was made with, in order
pub async fn countries_for(server: &MockServer, route: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "countryCode")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

pub fn read(path: impl AsRef<Path>) -> Vec<u8> {
    std::fs::read(path).unwrap()
}
