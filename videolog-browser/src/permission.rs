//! Library access permission state
//!
//! Holds the last status reported by the library. A denial is remembered
//! and surfaced as state; nothing retries automatically.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use videolog_common::events::{AuthorizationStatus, EventBus, VideologEvent};

use crate::library::MediaLibrary;

pub struct PermissionManager {
    library: Arc<dyn MediaLibrary>,
    status: RwLock<AuthorizationStatus>,
    event_bus: EventBus,
}

impl PermissionManager {
    /// Start from whatever the library already knows
    pub fn new(library: Arc<dyn MediaLibrary>, event_bus: EventBus) -> Self {
        let status = library.authorization_status();
        Self {
            library,
            status: RwLock::new(status),
            event_bus,
        }
    }

    /// Current status
    pub async fn status(&self) -> AuthorizationStatus {
        *self.status.read().await
    }

    pub async fn is_granted(&self) -> bool {
        self.status().await.is_granted()
    }

    /// Ask the library for access and publish the answer
    ///
    /// The new status is stored before the event goes out.
    pub async fn request_access(&self) -> AuthorizationStatus {
        let new_status = self.library.request_access().await;

        let old_status = {
            let mut status = self.status.write().await;
            std::mem::replace(&mut *status, new_status)
        };

        match new_status {
            AuthorizationStatus::Authorized => info!("Media library access granted"),
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                warn!("Media library access {}; enable it in system settings", new_status)
            }
            other => info!("Media library access is {}", other),
        }

        self.event_bus.emit_lossy(VideologEvent::AuthorizationChanged {
            old_status,
            new_status,
            timestamp: videolog_common::time::now(),
        });

        new_status
    }
}
