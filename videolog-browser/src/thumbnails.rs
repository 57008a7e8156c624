//! Thumbnail loading for a studio's cached assets
//!
//! Each asset that is not already `Ready` is put in `Loading` (including
//! one that failed in an earlier batch) and moves to `Ready` or `Failed`
//! when its fetch completes. A fetch that is cancelled, or never completes, leaves
//! the asset in `Loading`.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use videolog_common::events::{EventBus, ThumbnailSize, VideologEvent};
use videolog_common::time;

use crate::library::{MediaAsset, MediaLibrary, Thumbnail};

/// Default number of thumbnail requests in flight
pub const DEFAULT_THUMBNAIL_CONCURRENCY: usize = 4;

/// Per-asset thumbnail state
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailState {
    Loading,
    Ready(Arc<Thumbnail>),
    Failed(String),
}

/// Counts from one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailSummary {
    pub ready: usize,
    pub failed: usize,
    pub cancelled: usize,
}

enum Outcome {
    Ready,
    Failed,
    Cancelled,
}

pub struct ThumbnailLoader {
    library: Arc<dyn MediaLibrary>,
    event_bus: EventBus,
    concurrency: usize,
    states: RwLock<HashMap<String, ThumbnailState>>,
}

impl ThumbnailLoader {
    pub fn new(library: Arc<dyn MediaLibrary>, event_bus: EventBus) -> Self {
        Self {
            library,
            event_bus,
            concurrency: DEFAULT_THUMBNAIL_CONCURRENCY,
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Limit in-flight requests (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// State for an asset; `None` if never requested
    pub async fn state(&self, asset_id: &str) -> Option<ThumbnailState> {
        self.states.read().await.get(asset_id).cloned()
    }

    /// Fetch thumbnails for `assets` until done or `cancel` fires
    pub async fn load_all(
        &self,
        assets: &[MediaAsset],
        size: ThumbnailSize,
        cancel: &CancellationToken,
    ) -> ThumbnailSummary {
        {
            let mut states = self.states.write().await;
            for asset in assets {
                if !matches!(states.get(&asset.id), Some(ThumbnailState::Ready(_))) {
                    states.insert(asset.id.clone(), ThumbnailState::Loading);
                }
            }
        }

        let outcomes: Vec<Outcome> = stream::iter(assets)
            .map(|asset| self.load_one(asset, size, cancel))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = ThumbnailSummary::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Ready => summary.ready += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Cancelled => summary.cancelled += 1,
            }
        }

        info!(
            requested = assets.len(),
            ready = summary.ready,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Thumbnail batch finished"
        );
        summary
    }

    async fn load_one(
        &self,
        asset: &MediaAsset,
        size: ThumbnailSize,
        cancel: &CancellationToken,
    ) -> Outcome {
        if let Some(ThumbnailState::Ready(_)) = self.state(&asset.id).await {
            return Outcome::Ready;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(asset_id = %asset.id, "Thumbnail request cancelled");
                return Outcome::Cancelled;
            }
            result = self.library.fetch_thumbnail(asset, size) => result,
        };

        match result {
            Ok(thumbnail) => {
                let delivered = thumbnail.size;
                self.states
                    .write()
                    .await
                    .insert(asset.id.clone(), ThumbnailState::Ready(Arc::new(thumbnail)));
                self.event_bus.emit_lossy(VideologEvent::ThumbnailReady {
                    asset_id: asset.id.clone(),
                    size: delivered,
                    timestamp: time::now(),
                });
                Outcome::Ready
            }
            Err(e) => {
                warn!(asset_id = %asset.id, "Thumbnail fetch failed: {}", e);
                self.states
                    .write()
                    .await
                    .insert(asset.id.clone(), ThumbnailState::Failed(e.to_string()));
                self.event_bus.emit_lossy(VideologEvent::ThumbnailFailed {
                    asset_id: asset.id.clone(),
                    reason: e.to_string(),
                    timestamp: time::now(),
                });
                Outcome::Failed
            }
        }
    }
}
