//! Configuration types for tidal-relay

use crate::error::{Error, Result};
use crate::types::{QualityPreset, QualityTier};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Base output directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Replace artifacts that already exist (default: false)
    ///
    /// When disabled, an existing artifact is left untouched and counted as a
    /// completed item.
    #[serde(default)]
    pub overwrite: bool,

    /// Retry region-locked lookups and downloads through the other stored sessions (default: true)
    #[serde(default = "default_true")]
    pub region_failover: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            overwrite: false,
            region_failover: true,
        }
    }
}

/// Session storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionConfig {
    /// Path of the persisted session file (default: "./config/sessions.json")
    #[serde(default = "default_sessions_path")]
    pub path: PathBuf,

    /// Name of the session every request starts with (default: "TV")
    #[serde(default = "default_session_name")]
    pub default_session: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_sessions_path(),
            default_session: default_session_name(),
        }
    }
}

/// Remote catalog connection settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogConfig {
    /// API base URL, must end with a slash (default: "https://api.tidalhifi.com/v1/")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,

    /// Items requested per page for paginated listings (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

/// Download preset: quality flags plus artist expansion filters
///
/// The quality flags only select which tiers are attempted; the attempt order is
/// always highest fidelity first (see [`QualityPreset`]).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Preset {
    /// Request 24-bit hi-res streams
    #[serde(default = "default_true")]
    pub mqa_flac_24: bool,

    /// Request 16-bit lossless streams
    #[serde(default = "default_true")]
    pub flac_16: bool,

    /// Request 320 kbps AAC streams
    #[serde(default = "default_true")]
    pub aac_320: bool,

    /// Request 96 kbps AAC streams
    #[serde(default = "default_true")]
    pub aac_96: bool,

    /// Drop albums whose title mentions remix, commentary or karaoke (default: false)
    #[serde(default)]
    pub aggressive_remix_filtering: bool,

    /// Drop Sony 360 Reality Audio editions that duplicate a stereo album (default: true)
    #[serde(default = "default_true")]
    pub skip_360ra: bool,

    /// Drop single tracks that also appear on an album or EP (default: true)
    #[serde(default = "default_true")]
    pub skip_singles_when_possible: bool,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            mqa_flac_24: true,
            flac_16: true,
            aac_320: true,
            aac_96: true,
            aggressive_remix_filtering: false,
            skip_360ra: true,
            skip_singles_when_possible: true,
        }
    }
}

impl From<&Preset> for QualityPreset {
    fn from(preset: &Preset) -> Self {
        QualityPreset::from_flags([
            (QualityTier::HiRes, preset.mqa_flac_24),
            (QualityTier::Lossless, preset.flac_16),
            (QualityTier::High, preset.aac_320),
            (QualityTier::Low, preset.aac_96),
        ])
    }
}

/// Main configuration for MediaDownloader
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Output and retry behavior
    #[serde(default)]
    pub download: DownloadConfig,

    /// Session storage
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Remote catalog connection
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Quality tiers and artist filters
    #[serde(default)]
    pub preset: Preset,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load a configuration from a JSON file, filling omitted fields with defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.quality_preset().is_empty() {
            return Err(Error::Config {
                message: "at least one quality flag must be enabled".to_string(),
                key: Some("preset".to_string()),
            });
        }
        if !self.catalog.base_url.ends_with('/') {
            return Err(Error::Config {
                message: "catalog base URL must end with '/'".to_string(),
                key: Some("catalog.base_url".to_string()),
            });
        }
        if self.catalog.page_size == 0 {
            return Err(Error::Config {
                message: "page size must be greater than zero".to_string(),
                key: Some("catalog.page_size".to_string()),
            });
        }
        if self.sessions.default_session.trim().is_empty() {
            return Err(Error::Config {
                message: "default session name must not be empty".to_string(),
                key: Some("sessions.default_session".to_string()),
            });
        }
        Ok(())
    }

    /// Quality tiers derived from the preset flags
    pub fn quality_preset(&self) -> QualityPreset {
        QualityPreset::from(&self.preset)
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_sessions_path() -> PathBuf {
    PathBuf::from("./config/sessions.json")
}

fn default_session_name() -> String {
    "TV".to_string()
}

fn default_base_url() -> String {
    "https://api.tidalhifi.com/v1/".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_page_size() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
