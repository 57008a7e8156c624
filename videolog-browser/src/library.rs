//! Media library boundary
//!
//! Everything the browser needs from the platform media framework goes
//! through [`MediaLibrary`]. Assets are opaque and read-only here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use videolog_common::events::{AuthorizationStatus, ThumbnailSize};
use videolog_common::Coordinate;

/// Media library errors
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Operation needs library access that has not been granted
    #[error("Library access not granted ({0})")]
    NotAuthorized(AuthorizationStatus),

    /// No asset with this identifier
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Asset exists but the requested representation is unavailable
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Full asset is not on this device and network access was not allowed
    #[error("Asset {0} is not resident and network access is disabled")]
    NetworkRequired(String),

    /// Metadata for a format could not be decoded
    #[error("Failed to decode {format} metadata: {reason}")]
    Decode { format: String, reason: String },

    /// Library manifest could not be parsed or is inconsistent
    #[error("Invalid library manifest: {0}")]
    Manifest(String),

    /// I/O error (manifest or thumbnail file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A video item from the media library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Library-local identifier
    pub id: String,

    /// Where the clip was recorded
    #[serde(default)]
    pub location: Option<Coordinate>,

    /// When the clip was recorded
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Clip length in seconds
    #[serde(default)]
    pub duration_secs: Option<f64>,

    /// False when the full asset must be downloaded before decoding
    #[serde(default = "default_resident")]
    pub resident: bool,
}

fn default_resident() -> bool {
    true
}

impl MediaAsset {
    /// Minimal asset with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: None,
            created_at: None,
            duration_secs: None,
            resident: true,
        }
    }

    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Rendered preview image
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub asset_id: String,
    pub size: ThumbnailSize,
    /// Encoded image bytes as delivered by the library
    pub bytes: Vec<u8>,
}

/// Handle to the fully loaded, decodable form of an asset
#[derive(Debug, Clone, PartialEq)]
pub struct DecodableAsset {
    pub asset_id: String,
    /// True if producing this handle required a network download
    pub fetched_from_network: bool,
}

/// A container metadata format (e.g. QuickTime user data, iTunes, MP4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFormat(pub String);

impl MetadataFormat {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One key/value pair read from a metadata format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Format-specific key
    pub key: String,

    /// Cross-format key (e.g. "creationDate", "make", "model"), if the
    /// format maps this item to one
    #[serde(default)]
    pub common_key: Option<String>,

    pub value: String,
}

/// Platform media library capability consumed by the browser
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Prompt for access (or return the remembered answer)
    async fn request_access(&self) -> AuthorizationStatus;

    /// Current status without prompting
    fn authorization_status(&self) -> AuthorizationStatus;

    /// All video assets, in library order
    async fn enumerate_video_assets(&self) -> Result<Vec<MediaAsset>, LibraryError>;

    /// Preview image no larger than `target`
    async fn fetch_thumbnail(
        &self,
        asset: &MediaAsset,
        target: ThumbnailSize,
    ) -> Result<Thumbnail, LibraryError>;

    /// Full decodable form; may download when `allow_network` is set
    async fn load_decodable(
        &self,
        asset: &MediaAsset,
        allow_network: bool,
    ) -> Result<DecodableAsset, LibraryError>;

    /// Metadata formats present in the asset
    async fn list_metadata_formats(
        &self,
        decodable: &DecodableAsset,
    ) -> Result<Vec<MetadataFormat>, LibraryError>;

    /// Items of one metadata format
    async fn load_metadata(
        &self,
        decodable: &DecodableAsset,
        format: &MetadataFormat,
    ) -> Result<Vec<MetadataItem>, LibraryError>;
}
