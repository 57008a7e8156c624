//! File-backed media library
//!
//! A JSON manifest describes the library: the authorization answer the
//! "user" gives, and every video asset with its location, creation time,
//! thumbnail file and per-format metadata. Thumbnail paths are resolved
//! relative to the manifest's directory.
//!
//! ```json
//! {
//!   "authorization": "authorized",
//!   "assets": [
//!     {
//!       "id": "CLIP-0001",
//!       "location": { "latitude": 37.4757, "longitude": -122.2132 },
//!       "created_at": "2025-01-04T18:22:10Z",
//!       "duration_secs": 42.0,
//!       "resident": false,
//!       "thumbnail": "thumbs/clip-0001.jpg",
//!       "metadata": [
//!         { "format": "com.apple.quicktime.mdta",
//!           "items": [ { "key": "com.apple.quicktime.make", "common_key": "make", "value": "Apple" } ] },
//!         { "format": "org.mp4ra", "error": "truncated atom" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};
use videolog_common::events::{AuthorizationStatus, ThumbnailSize};

use crate::library::{
    DecodableAsset, LibraryError, MediaAsset, MediaLibrary, MetadataFormat, MetadataItem,
    Thumbnail,
};

/// One metadata format block of a manifest asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFormat {
    pub format: MetadataFormat,
    #[serde(default)]
    pub items: Vec<MetadataItem>,
    /// When set, loading this format fails with this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One asset entry of a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestAsset {
    #[serde(flatten)]
    pub asset: MediaAsset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
    #[serde(default)]
    pub metadata: Vec<ManifestFormat>,
}

/// Whole manifest document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Answer given when access is requested
    #[serde(default = "default_authorization")]
    pub authorization: AuthorizationStatus,
    #[serde(default)]
    pub assets: Vec<ManifestAsset>,
}

fn default_authorization() -> AuthorizationStatus {
    AuthorizationStatus::Authorized
}

impl Manifest {
    /// Reject entries the library could never have produced
    fn validate(&self) -> Result<(), LibraryError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.assets {
            let id = &entry.asset.id;
            if id.is_empty() {
                return Err(LibraryError::Manifest("asset with empty id".to_string()));
            }
            if !seen.insert(id.as_str()) {
                return Err(LibraryError::Manifest(format!("duplicate asset id {}", id)));
            }
            if let Some(location) = &entry.asset.location {
                location
                    .validate()
                    .map_err(|e| LibraryError::Manifest(format!("asset {}: {}", id, e)))?;
            }
        }
        Ok(())
    }
}

pub struct ManifestLibrary {
    manifest: Manifest,
    base_dir: PathBuf,
    status: watch::Sender<AuthorizationStatus>,
}

impl ManifestLibrary {
    /// Library over an in-memory manifest; thumbnails resolve against `base_dir`
    pub fn from_manifest(
        manifest: Manifest,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, LibraryError> {
        manifest.validate()?;
        let (status, _) = watch::channel(AuthorizationStatus::NotDetermined);
        Ok(Self {
            manifest,
            base_dir: base_dir.into(),
            status,
        })
    }

    /// Read a manifest file
    pub async fn load(path: &Path) -> Result<Self, LibraryError> {
        let content = tokio::fs::read_to_string(path).await?;
        let manifest: Manifest = serde_json::from_str(&content)
            .map_err(|e| LibraryError::Manifest(format!("{}: {}", path.display(), e)))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        info!(
            manifest = %path.display(),
            assets = manifest.assets.len(),
            "Loaded library manifest"
        );
        Self::from_manifest(manifest, base_dir)
    }

    fn entry(&self, asset_id: &str) -> Result<&ManifestAsset, LibraryError> {
        self.manifest
            .assets
            .iter()
            .find(|e| e.asset.id == asset_id)
            .ok_or_else(|| LibraryError::AssetNotFound(asset_id.to_string()))
    }

    fn require_access(&self) -> Result<(), LibraryError> {
        let status = self.authorization_status();
        if status.is_granted() {
            Ok(())
        } else {
            Err(LibraryError::NotAuthorized(status))
        }
    }
}

#[async_trait]
impl MediaLibrary for ManifestLibrary {
    async fn request_access(&self) -> AuthorizationStatus {
        let answer = self.manifest.authorization;
        self.status.send_replace(answer);
        answer
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.borrow()
    }

    async fn enumerate_video_assets(&self) -> Result<Vec<MediaAsset>, LibraryError> {
        self.require_access()?;
        Ok(self
            .manifest
            .assets
            .iter()
            .map(|e| e.asset.clone())
            .collect())
    }

    async fn fetch_thumbnail(
        &self,
        asset: &MediaAsset,
        target: ThumbnailSize,
    ) -> Result<Thumbnail, LibraryError> {
        self.require_access()?;
        let entry = self.entry(&asset.id)?;
        let relative = entry.thumbnail.as_ref().ok_or_else(|| {
            LibraryError::Unavailable(format!("no thumbnail for asset {}", asset.id))
        })?;

        let path = self.base_dir.join(relative);
        debug!(asset_id = %asset.id, path = %path.display(), "Reading thumbnail");
        let bytes = tokio::fs::read(&path).await?;

        Ok(Thumbnail {
            asset_id: asset.id.clone(),
            size: target,
            bytes,
        })
    }

    async fn load_decodable(
        &self,
        asset: &MediaAsset,
        allow_network: bool,
    ) -> Result<DecodableAsset, LibraryError> {
        self.require_access()?;
        let entry = self.entry(&asset.id)?;
        if !entry.asset.resident && !allow_network {
            return Err(LibraryError::NetworkRequired(asset.id.clone()));
        }
        Ok(DecodableAsset {
            asset_id: asset.id.clone(),
            fetched_from_network: !entry.asset.resident,
        })
    }

    async fn list_metadata_formats(
        &self,
        decodable: &DecodableAsset,
    ) -> Result<Vec<MetadataFormat>, LibraryError> {
        self.require_access()?;
        let entry = self.entry(&decodable.asset_id)?;
        Ok(entry.metadata.iter().map(|m| m.format.clone()).collect())
    }

    async fn load_metadata(
        &self,
        decodable: &DecodableAsset,
        format: &MetadataFormat,
    ) -> Result<Vec<MetadataItem>, LibraryError> {
        self.require_access()?;
        let entry = self.entry(&decodable.asset_id)?;
        let block = entry
            .metadata
            .iter()
            .find(|m| &m.format == format)
            .ok_or_else(|| LibraryError::Unavailable(format!("format {} not present", format)))?;

        match &block.error {
            Some(reason) => Err(LibraryError::Decode {
                format: format.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(block.items.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "assets": [
            {
                "id": "CLIP-1",
                "location": { "latitude": 37.4757, "longitude": -122.2132 },
                "created_at": "2025-01-04T18:22:10Z",
                "resident": false,
                "thumbnail": "clip-1.jpg",
                "metadata": [
                    { "format": "mdta", "items": [
                        { "key": "com.apple.quicktime.make", "common_key": "make", "value": "Apple" },
                        { "key": "com.apple.quicktime.private", "value": "x" }
                    ] },
                    { "format": "udta", "error": "truncated atom" }
                ]
            },
            { "id": "CLIP-2" }
        ]
    }"#;

    fn library() -> ManifestLibrary {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        ManifestLibrary::from_manifest(manifest, "/nonexistent").unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.authorization, AuthorizationStatus::Authorized);
        let bare = &manifest.assets[1].asset;
        assert!(bare.location.is_none());
        assert!(bare.created_at.is_none());
        assert!(bare.resident);
        assert!(!manifest.assets[0].asset.resident);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let manifest: Manifest =
            serde_json::from_str(r#"{ "assets": [ { "id": "A" }, { "id": "A" } ] }"#).unwrap();
        assert!(matches!(
            ManifestLibrary::from_manifest(manifest, "."),
            Err(LibraryError::Manifest(_))
        ));
    }

    #[test]
    fn test_out_of_range_location_rejected() {
        let manifest: Manifest = serde_json::from_str(
            r#"{ "assets": [ { "id": "A", "location": { "latitude": 95.0, "longitude": 0.0 } } ] }"#,
        )
        .unwrap();
        assert!(ManifestLibrary::from_manifest(manifest, ".").is_err());
    }

    #[tokio::test]
    async fn test_enumeration_requires_access() {
        let library = library();
        assert_eq!(library.authorization_status(), AuthorizationStatus::NotDetermined);
        assert!(matches!(
            library.enumerate_video_assets().await,
            Err(LibraryError::NotAuthorized(AuthorizationStatus::NotDetermined))
        ));

        assert_eq!(library.request_access().await, AuthorizationStatus::Authorized);
        let ids: Vec<_> = library
            .enumerate_video_assets()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["CLIP-1", "CLIP-2"]);
    }

    #[tokio::test]
    async fn test_non_resident_asset_needs_network() {
        let library = library();
        library.request_access().await;
        let asset = MediaAsset::new("CLIP-1");

        assert!(matches!(
            library.load_decodable(&asset, false).await,
            Err(LibraryError::NetworkRequired(_))
        ));
        let decodable = library.load_decodable(&asset, true).await.unwrap();
        assert!(decodable.fetched_from_network);
    }

    #[tokio::test]
    async fn test_format_error_is_reported() {
        let library = library();
        library.request_access().await;
        let decodable = library
            .load_decodable(&MediaAsset::new("CLIP-1"), true)
            .await
            .unwrap();

        let formats = library.list_metadata_formats(&decodable).await.unwrap();
        assert_eq!(formats, vec![MetadataFormat::new("mdta"), MetadataFormat::new("udta")]);

        assert_eq!(library.load_metadata(&decodable, &formats[0]).await.unwrap().len(), 2);
        assert!(matches!(
            library.load_metadata(&decodable, &formats[1]).await,
            Err(LibraryError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_metadata_reads_require_access() {
        let library = library();
        let decodable = DecodableAsset {
            asset_id: "CLIP-1".to_string(),
            fetched_from_network: false,
        };
        assert!(matches!(
            library.list_metadata_formats(&decodable).await,
            Err(LibraryError::NotAuthorized(AuthorizationStatus::NotDetermined))
        ));
        assert!(matches!(
            library
                .load_metadata(&decodable, &MetadataFormat::new("mdta"))
                .await,
            Err(LibraryError::NotAuthorized(_))
        ));

        library.request_access().await;
        assert_eq!(library.list_metadata_formats(&decodable).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_thumbnail_missing_file_is_io_error() {
        let library = library();
        library.request_access().await;
        let result = library
            .fetch_thumbnail(&MediaAsset::new("CLIP-1"), ThumbnailSize::default())
            .await;
        assert!(matches!(result, Err(LibraryError::Io(_))));

        let result = library
            .fetch_thumbnail(&MediaAsset::new("CLIP-2"), ThumbnailSize::default())
            .await;
        assert!(matches!(result, Err(LibraryError::Unavailable(_))));
    }
}
