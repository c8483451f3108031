//! Utility functions for output naming and path lookup

use std::path::{Path, PathBuf};

/// Extensions the backend writes; an existing file with any of them counts as present
pub const ARTIFACT_EXTENSIONS: [&str; 3] = ["flac", "m4a", "ts"];

/// Make a catalog name safe to use as a single path component
///
/// Path separators and characters reserved on common filesystems are removed,
/// `:` becomes ` -`, runs of whitespace collapse, and leading/trailing dots and
/// spaces are trimmed.
///
/// # Examples
///
/// ```
/// use tidal_relay::utils::sanitize_name;
///
/// assert_eq!(sanitize_name("AC/DC: Live?"), "ACDC - Live");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ':' => cleaned.push_str(" -"),
            '/' | '\\' | '*' | '?' | '"' | '<' | '>' | '|' => {}
            c if c.is_control() => {}
            c => cleaned.push(c),
        }
    }

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File stem for a track, e.g. `"03 - Song (Live)"`
pub fn track_file_stem(track_number: Option<u32>, title: &str) -> String {
    match track_number {
        Some(n) => format!("{:02} - {}", n, sanitize_name(title)),
        None => sanitize_name(title),
    }
}

/// Directory name for an album, `"Creator - Title"` or just the title
pub fn album_directory_name(creator: Option<&str>, title: &str) -> String {
    match creator {
        Some(creator) if !creator.trim().is_empty() => {
            format!("{} - {}", sanitize_name(creator), sanitize_name(title))
        }
        _ => sanitize_name(title),
    }
}

/// Find a previously written artifact `dir/stem.{ext}` for any known extension
pub async fn find_existing_artifact(dir: &Path, stem: &str) -> Option<PathBuf> {
    for ext in ARTIFACT_EXTENSIONS {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }
    None
}
