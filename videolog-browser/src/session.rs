//! Browse session
//!
//! Owns the state a UI reads (studio registry, permission status, asset
//! cache, thumbnail and inspection states) and publishes a VideologEvent
//! after every write. A UI drives it from lifecycle hooks:
//!
//! 1. `request_access()` when the studio list appears
//! 2. `open_studio()` when a studio's screen appears
//! 3. `load_thumbnails()` once `open_studio()` has returned assets
//! 4. `inspect_asset()` when one clip is selected

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use videolog_common::events::{AuthorizationStatus, EventBus, ThumbnailSize, VideologEvent};
use videolog_common::{time, AcceptanceWindow};

use crate::error::{SessionError, SessionResult};
use crate::filter::{AssetCache, AssetList};
use crate::library::{MediaAsset, MediaLibrary};
use crate::metadata::{MetadataInspector, MetadataReport};
use crate::permission::PermissionManager;
use crate::studio::{Studio, StudioId, StudioRegistry};
use crate::thumbnails::{ThumbnailLoader, ThumbnailSummary};

pub struct BrowseSession {
    library: Arc<dyn MediaLibrary>,
    registry: Arc<StudioRegistry>,
    permissions: PermissionManager,
    cache: AssetCache,
    thumbnails: ThumbnailLoader,
    inspector: MetadataInspector,
    event_bus: EventBus,
}

impl BrowseSession {
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        registry: Arc<StudioRegistry>,
        window: AcceptanceWindow,
        event_bus: EventBus,
    ) -> Self {
        Self {
            permissions: PermissionManager::new(Arc::clone(&library), event_bus.clone()),
            cache: AssetCache::new(window),
            thumbnails: ThumbnailLoader::new(Arc::clone(&library), event_bus.clone()),
            inspector: MetadataInspector::new(Arc::clone(&library), event_bus.clone()),
            library,
            registry,
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn library(&self) -> Arc<dyn MediaLibrary> {
        Arc::clone(&self.library)
    }

    pub fn registry(&self) -> &StudioRegistry {
        &self.registry
    }

    /// Studios in display order
    pub fn studios(&self) -> &[Studio] {
        self.registry.studios()
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn thumbnails(&self) -> &ThumbnailLoader {
        &self.thumbnails
    }

    pub fn inspector(&self) -> &MetadataInspector {
        &self.inspector
    }

    pub async fn authorization_status(&self) -> AuthorizationStatus {
        self.permissions.status().await
    }

    /// Ask the library for access
    pub async fn request_access(&self) -> AuthorizationStatus {
        self.permissions.request_access().await
    }

    fn studio(&self, studio_id: StudioId) -> SessionResult<&Studio> {
        self.registry
            .get(studio_id)
            .ok_or(SessionError::UnknownStudio(studio_id))
    }

    /// Filtered assets for a studio
    ///
    /// Without access this is a no-op returning `Ok(None)`; nothing is
    /// cached, so a later call after access is granted still filters. With
    /// access, returns the cached result when one exists without touching
    /// the library, otherwise enumerates, filters and caches.
    pub async fn open_studio(&self, studio_id: StudioId) -> SessionResult<Option<AssetList>> {
        let studio = self.studio(studio_id)?;

        let status = self.permissions.status().await;
        if !status.is_granted() {
            debug!(studio = %studio.name(), %status, "Skipping asset load, access not granted");
            return Ok(None);
        }

        if let Some(assets) = self.cache.get(studio_id).await {
            self.publish_ready(studio, &assets, true);
            return Ok(Some(assets));
        }

        let all_assets = self.library.enumerate_video_assets().await?;
        let outcome = self
            .cache
            .filter_assets_at(studio, &all_assets, time::now())
            .await;

        info!(
            studio = %studio.name(),
            assets = outcome.assets.len(),
            window = %self.cache.window(),
            "Studio assets ready"
        );
        self.publish_ready(studio, &outcome.assets, outcome.from_cache);
        Ok(Some(outcome.assets))
    }

    fn publish_ready(&self, studio: &Studio, assets: &AssetList, from_cache: bool) {
        self.event_bus.emit_lossy(VideologEvent::StudioAssetsReady {
            studio_id: studio.id().as_uuid(),
            asset_count: assets.len(),
            from_cache,
            timestamp: time::now(),
        });
    }

    /// Load thumbnails for an opened studio's assets
    ///
    /// Fails with `StudioNotLoaded` if `open_studio` has not produced a
    /// result for this studio yet.
    pub async fn load_thumbnails(
        &self,
        studio_id: StudioId,
        size: ThumbnailSize,
        cancel: &CancellationToken,
    ) -> SessionResult<ThumbnailSummary> {
        self.studio(studio_id)?;
        let assets = self
            .cache
            .get(studio_id)
            .await
            .ok_or(SessionError::StudioNotLoaded(studio_id))?;
        Ok(self.thumbnails.load_all(&assets, size, cancel).await)
    }

    /// Find an asset by id, checking cached studio results first
    pub async fn find_asset(&self, asset_id: &str) -> SessionResult<MediaAsset> {
        for studio in self.registry.studios() {
            if let Some(assets) = self.cache.get(studio.id()).await {
                if let Some(asset) = assets.iter().find(|a| a.id == asset_id) {
                    return Ok(asset.clone());
                }
            }
        }

        if !self.permissions.is_granted().await {
            return Err(SessionError::NotAuthorized);
        }

        self.library
            .enumerate_video_assets()
            .await?
            .into_iter()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| SessionError::UnknownAsset(asset_id.to_string()))
    }

    /// Read the metadata of one asset
    pub async fn inspect_asset(&self, asset: &MediaAsset) -> SessionResult<Arc<MetadataReport>> {
        Ok(self.inspector.inspect(asset).await?)
    }
}
