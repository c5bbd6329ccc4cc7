//! Application state management
//!
//! Holds the process-wide resources shared across requests: the immutable
//! model registry and the upload limits. Nothing here is mutable after
//! startup and nothing persists per-request data.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::UploadSettings;
use crate::inference::ModelRegistry;

/// Central application state, cheap to clone per worker
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ModelRegistry>,
    upload: UploadSettings,
    start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, upload: UploadSettings) -> Self {
        info!("Initializing application state");
        Self {
            registry: Arc::new(registry),
            upload,
            start_time: Utc::now(),
        }
    }

    /// Shared read-only model registry
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Upload limits from configuration
    pub fn upload_settings(&self) -> &UploadSettings {
        &self.upload
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(
            ModelRegistry::with_builtins(),
            UploadSettings {
                max_images: 10,
                max_image_bytes: 8_388_608,
            },
        )
    }

    #[test]
    fn test_state_creation() {
        let state = test_state();
        assert_eq!(state.upload_settings().max_images, 10);
    }

    #[test]
    fn test_clones_share_registry() {
        let state = test_state();
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.registry, &cloned.registry));
    }
}
