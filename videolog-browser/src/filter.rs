//! Location/time-windowed asset filter with a per-studio memoization cache
//!
//! The first result computed for a studio is frozen: later calls return it
//! unchanged even if the library contents or the acceptance window would
//! now give a different answer. Entries are never evicted or refreshed.
//!
//! Known limitation: the underlying library can change during a session
//! and nothing here notices.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use videolog_common::{time, AcceptanceWindow};

use crate::library::MediaAsset;
use crate::studio::{Studio, StudioId};

/// Shared, immutable filter result
pub type AssetList = Arc<Vec<MediaAsset>>;

/// Result of a cache lookup-or-compute
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub assets: AssetList,
    /// True if no filtering happened on this call
    pub from_cache: bool,
}

/// Whether one asset belongs to a studio under `window` evaluated at `now`
///
/// Requires a location within `studio.radius_m()` (inclusive) and a
/// creation timestamp accepted by the window.
pub fn asset_matches(
    studio: &Studio,
    asset: &MediaAsset,
    window: &AcceptanceWindow,
    now: DateTime<Utc>,
) -> bool {
    let Some(location) = asset.location else {
        return false;
    };
    if !window.accepts(asset.created_at, now) {
        return false;
    }
    studio.center().distance_to(&location) <= studio.radius_m()
}

/// Filter an enumeration, preserving its order
pub fn select_assets(
    studio: &Studio,
    all_assets: &[MediaAsset],
    window: &AcceptanceWindow,
    now: DateTime<Utc>,
) -> Vec<MediaAsset> {
    all_assets
        .iter()
        .filter(|asset| asset_matches(studio, asset, window, now))
        .cloned()
        .collect()
}

/// Write-once-per-studio cache of filter results
pub struct AssetCache {
    window: AcceptanceWindow,
    entries: RwLock<HashMap<StudioId, AssetList>>,
}

impl AssetCache {
    pub fn new(window: AcceptanceWindow) -> Self {
        Self {
            window,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Acceptance window used for new entries
    pub fn window(&self) -> AcceptanceWindow {
        self.window
    }

    /// Cached result for a studio, if any
    pub async fn get(&self, studio_id: StudioId) -> Option<AssetList> {
        self.entries.read().await.get(&studio_id).cloned()
    }

    pub async fn contains(&self, studio_id: StudioId) -> bool {
        self.entries.read().await.contains_key(&studio_id)
    }

    /// Number of studios with a cached result
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Filter `all_assets` for `studio`, or return the frozen result
    pub async fn filter_assets(&self, studio: &Studio, all_assets: &[MediaAsset]) -> AssetList {
        self.filter_assets_at(studio, all_assets, time::now())
            .await
            .assets
    }

    /// As [`AssetCache::filter_assets`], with an explicit clock reading
    pub async fn filter_assets_at(
        &self,
        studio: &Studio,
        all_assets: &[MediaAsset],
        now: DateTime<Utc>,
    ) -> FilterOutcome {
        if let Some(assets) = self.get(studio.id()).await {
            return FilterOutcome {
                assets,
                from_cache: true,
            };
        }

        let mut entries = self.entries.write().await;

        // Another caller may have filled the entry while we waited
        if let Some(assets) = entries.get(&studio.id()) {
            return FilterOutcome {
                assets: Arc::clone(assets),
                from_cache: true,
            };
        }

        let selected = select_assets(studio, all_assets, &self.window, now);
        debug!(
            studio = %studio.name(),
            studio_id = %studio.id(),
            scanned = all_assets.len(),
            matched = selected.len(),
            cutoff = %self.window.cutoff(now),
            "Filtered assets for studio"
        );

        let assets = Arc::new(selected);
        entries.insert(studio.id(), Arc::clone(&assets));
        FilterOutcome {
            assets,
            from_cache: false,
        }
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new(AcceptanceWindow::default())
    }
}
