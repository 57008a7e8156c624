//! Shared test fixtures: a scripted media library and geometry helpers

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use videolog_browser::library::{
    DecodableAsset, LibraryError, MediaAsset, MediaLibrary, MetadataFormat, MetadataItem,
    Thumbnail,
};
use videolog_browser::Studio;
use videolog_common::events::{AuthorizationStatus, ThumbnailSize};
use videolog_common::geo::EARTH_MEAN_RADIUS_M;
use videolog_common::Coordinate;

/// Studio location used throughout the scenario tests
pub const STUDIO_LAT: f64 = 37.47567;
pub const STUDIO_LON: f64 = -122.21316;

pub fn scenario_studio() -> Studio {
    Studio::new(
        "Harbor Room",
        Coordinate::new(STUDIO_LAT, STUDIO_LON).unwrap(),
        100.0,
    )
    .unwrap()
}

/// Point `meters` due north of `origin` along the meridian
pub fn north_of(origin: Coordinate, meters: f64) -> Coordinate {
    Coordinate::new(
        origin.latitude + (meters / EARTH_MEAN_RADIUS_M).to_degrees(),
        origin.longitude,
    )
    .unwrap()
}

pub fn asset_at(id: &str, location: Coordinate, created_at: DateTime<Utc>) -> MediaAsset {
    MediaAsset::new(id)
        .with_location(location)
        .with_created_at(created_at)
}

/// How the mock answers a thumbnail request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailBehavior {
    Deliver,
    Fail,
    Hang,
}

/// Scripted in-memory media library
pub struct MockLibrary {
    answer: AuthorizationStatus,
    status: Mutex<AuthorizationStatus>,
    assets: Mutex<Vec<MediaAsset>>,
    pub enumerations: AtomicUsize,
    pub access_requests: AtomicUsize,
    thumbnails: Mutex<HashMap<String, ThumbnailBehavior>>,
    undecodable: Mutex<HashSet<String>>,
    formats: Mutex<Vec<(MetadataFormat, Result<Vec<MetadataItem>, String>)>>,
}

impl MockLibrary {
    /// Library that answers `answer` when access is requested
    pub fn new(answer: AuthorizationStatus, assets: Vec<MediaAsset>) -> Self {
        Self {
            answer,
            status: Mutex::new(AuthorizationStatus::NotDetermined),
            assets: Mutex::new(assets),
            enumerations: AtomicUsize::new(0),
            access_requests: AtomicUsize::new(0),
            thumbnails: Mutex::new(HashMap::new()),
            undecodable: Mutex::new(HashSet::new()),
            formats: Mutex::new(Vec::new()),
        }
    }

    pub fn authorized(assets: Vec<MediaAsset>) -> Self {
        Self::new(AuthorizationStatus::Authorized, assets)
    }

    /// Replace the library contents (simulates new recordings)
    pub fn set_assets(&self, assets: Vec<MediaAsset>) {
        *self.assets.lock().unwrap() = assets;
    }

    pub fn set_thumbnail(&self, asset_id: &str, behavior: ThumbnailBehavior) {
        self.thumbnails
            .lock()
            .unwrap()
            .insert(asset_id.to_string(), behavior);
    }

    pub fn set_undecodable(&self, asset_id: &str) {
        self.undecodable.lock().unwrap().insert(asset_id.to_string());
    }

    pub fn add_format(&self, name: &str, items: Vec<MetadataItem>) {
        self.formats
            .lock()
            .unwrap()
            .push((MetadataFormat::new(name), Ok(items)));
    }

    pub fn add_broken_format(&self, name: &str, reason: &str) {
        self.formats
            .lock()
            .unwrap()
            .push((MetadataFormat::new(name), Err(reason.to_string())));
    }

    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

pub fn item(key: &str, common_key: Option<&str>, value: &str) -> MetadataItem {
    MetadataItem {
        key: key.to_string(),
        common_key: common_key.map(str::to_string),
        value: value.to_string(),
    }
}

#[async_trait]
impl MediaLibrary for MockLibrary {
    async fn request_access(&self) -> AuthorizationStatus {
        self.access_requests.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = self.answer;
        self.answer
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock().unwrap()
    }

    async fn enumerate_video_assets(&self) -> Result<Vec<MediaAsset>, LibraryError> {
        let status = self.authorization_status();
        if !status.is_granted() {
            return Err(LibraryError::NotAuthorized(status));
        }
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self.assets.lock().unwrap().clone())
    }

    async fn fetch_thumbnail(
        &self,
        asset: &MediaAsset,
        target: ThumbnailSize,
    ) -> Result<Thumbnail, LibraryError> {
        let behavior = self
            .thumbnails
            .lock()
            .unwrap()
            .get(&asset.id)
            .copied()
            .unwrap_or(ThumbnailBehavior::Deliver);

        match behavior {
            ThumbnailBehavior::Deliver => Ok(Thumbnail {
                asset_id: asset.id.clone(),
                size: target,
                bytes: vec![0xFF, 0xD8, 0xFF],
            }),
            ThumbnailBehavior::Fail => {
                Err(LibraryError::Unavailable(format!("no preview for {}", asset.id)))
            }
            ThumbnailBehavior::Hang => std::future::pending().await,
        }
    }

    async fn load_decodable(
        &self,
        asset: &MediaAsset,
        allow_network: bool,
    ) -> Result<DecodableAsset, LibraryError> {
        if self.undecodable.lock().unwrap().contains(&asset.id) {
            return Err(LibraryError::Unavailable(format!(
                "no playable item for {}",
                asset.id
            )));
        }
        if !asset.resident && !allow_network {
            return Err(LibraryError::NetworkRequired(asset.id.clone()));
        }
        Ok(DecodableAsset {
            asset_id: asset.id.clone(),
            fetched_from_network: !asset.resident,
        })
    }

    async fn list_metadata_formats(
        &self,
        _decodable: &DecodableAsset,
    ) -> Result<Vec<MetadataFormat>, LibraryError> {
        Ok(self
            .formats
            .lock()
            .unwrap()
            .iter()
            .map(|(f, _)| f.clone())
            .collect())
    }

    async fn load_metadata(
        &self,
        _decodable: &DecodableAsset,
        format: &MetadataFormat,
    ) -> Result<Vec<MetadataItem>, LibraryError> {
        let formats = self.formats.lock().unwrap();
        let (_, result) = formats
            .iter()
            .find(|(f, _)| f == format)
            .ok_or_else(|| LibraryError::Unavailable(format.to_string()))?;
        result.clone().map_err(|reason| LibraryError::Decode {
            format: format.to_string(),
            reason,
        })
    }
}
