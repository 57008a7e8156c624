//! Metadata inspection for a single asset
//!
//! Loads the asset's decodable form, then reads every metadata format it
//! carries and keeps the items that map to a common (cross-format) key.
//! A format that fails to load is logged and recorded; the remaining
//! formats are still read.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use videolog_common::events::{EventBus, VideologEvent};
use videolog_common::time;

use crate::library::{LibraryError, MediaAsset, MediaLibrary, MetadataFormat};

/// Inspection errors
#[derive(Debug, Error)]
pub enum InspectError {
    /// The library could not produce a decodable form
    #[error("No decodable form for asset {asset_id}: {source}")]
    NoDecodableForm {
        asset_id: String,
        #[source]
        source: LibraryError,
    },

    /// The list of metadata formats could not be read
    #[error("Could not list metadata formats for asset {asset_id}: {source}")]
    FormatsUnavailable {
        asset_id: String,
        #[source]
        source: LibraryError,
    },
}

/// One common-key item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataEntry {
    pub format: MetadataFormat,
    pub common_key: String,
    /// Format-specific key the value was read from
    pub key: String,
    pub value: String,
}

/// A format that could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatFailure {
    pub format: MetadataFormat,
    pub reason: String,
}

/// Everything learned about one asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataReport {
    pub asset_id: String,
    /// Entries in format order, then item order within a format
    pub entries: Vec<MetadataEntry>,
    pub failed_formats: Vec<FormatFailure>,
    pub fetched_from_network: bool,
}

impl MetadataReport {
    /// First value for a common key across all formats
    pub fn value_for(&self, common_key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.common_key == common_key)
            .map(|e| e.value.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.failed_formats.is_empty()
    }
}

/// Per-asset inspection progress
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InspectionState {
    #[default]
    NotRequested,
    Requesting,
    Available(Arc<MetadataReport>),
    Failed(String),
}

pub struct MetadataInspector {
    library: Arc<dyn MediaLibrary>,
    event_bus: EventBus,
    allow_network: bool,
    states: RwLock<HashMap<String, InspectionState>>,
}

impl MetadataInspector {
    /// Inspector that allows network downloads of non-resident assets
    pub fn new(library: Arc<dyn MediaLibrary>, event_bus: EventBus) -> Self {
        Self {
            library,
            event_bus,
            allow_network: true,
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Restrict inspection to assets already on the device
    pub fn local_only(mut self) -> Self {
        self.allow_network = false;
        self
    }

    pub async fn state(&self, asset_id: &str) -> InspectionState {
        self.states
            .read()
            .await
            .get(asset_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn set_state(&self, asset_id: &str, state: InspectionState) {
        self.states.write().await.insert(asset_id.to_string(), state);
    }

    /// Read the common-key metadata of `asset`
    pub async fn inspect(&self, asset: &MediaAsset) -> Result<Arc<MetadataReport>, InspectError> {
        self.set_state(&asset.id, InspectionState::Requesting).await;

        match self.read_report(asset).await {
            Ok(report) => {
                let report = Arc::new(report);
                self.set_state(&asset.id, InspectionState::Available(Arc::clone(&report)))
                    .await;

                info!(
                    asset_id = %asset.id,
                    items = report.entries.len(),
                    failed_formats = report.failed_formats.len(),
                    "Metadata inspected"
                );
                self.event_bus.emit_lossy(VideologEvent::MetadataInspected {
                    asset_id: asset.id.clone(),
                    item_count: report.entries.len(),
                    failed_formats: report
                        .failed_formats
                        .iter()
                        .map(|f| f.format.to_string())
                        .collect(),
                    timestamp: time::now(),
                });
                Ok(report)
            }
            Err(e) => {
                warn!("Metadata inspection failed: {}", e);
                self.set_state(&asset.id, InspectionState::Failed(e.to_string()))
                    .await;
                self.event_bus.emit_lossy(VideologEvent::InspectionFailed {
                    asset_id: asset.id.clone(),
                    reason: e.to_string(),
                    timestamp: time::now(),
                });
                Err(e)
            }
        }
    }

    async fn read_report(&self, asset: &MediaAsset) -> Result<MetadataReport, InspectError> {
        let decodable = self
            .library
            .load_decodable(asset, self.allow_network)
            .await
            .map_err(|source| InspectError::NoDecodableForm {
                asset_id: asset.id.clone(),
                source,
            })?;

        let formats = self
            .library
            .list_metadata_formats(&decodable)
            .await
            .map_err(|source| InspectError::FormatsUnavailable {
                asset_id: asset.id.clone(),
                source,
            })?;

        let mut entries = Vec::new();
        let mut failed_formats = Vec::new();

        for format in formats {
            match self.library.load_metadata(&decodable, &format).await {
                Ok(items) => {
                    debug!(
                        asset_id = %asset.id,
                        format = %format,
                        items = items.len(),
                        "Loaded metadata format"
                    );
                    entries.extend(items.into_iter().filter_map(|item| {
                        item.common_key.map(|common_key| MetadataEntry {
                            format: format.clone(),
                            common_key,
                            key: item.key,
                            value: item.value,
                        })
                    }));
                }
                Err(e) => {
                    warn!(
                        asset_id = %asset.id,
                        format = %format,
                        "Failed to load metadata: {}",
                        e
                    );
                    failed_formats.push(FormatFailure {
                        format,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(MetadataReport {
            asset_id: asset.id.clone(),
            entries,
            failed_formats,
            fetched_from_network: decodable.fetched_from_network,
        })
    }
}
