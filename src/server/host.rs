//! Server host holding the shared application state
//!
//! The host is built once by the [`ServerBuilder`](super::ServerBuilder) and
//! shared by every handler through `State<Arc<ServerHost>>`.

use crate::attachments::{ImageStore, UploadPolicy};
use crate::config::AppConfig;
use crate::core::service::RequestStore;
use std::sync::Arc;

/// Host context containing all service state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(
///     AppConfig::default(),
///     Arc::new(InMemoryRequestStore::new()),
///     Arc::new(LocalImageStore::from_config(&config.images)),
/// );
///
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    /// Configuration the server was started with
    pub config: Arc<AppConfig>,

    /// Record store for procurement requests
    pub store: Arc<dyn RequestStore>,

    /// Destination for submitted photos
    pub images: Arc<dyn ImageStore>,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn RequestStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            images,
        }
    }

    /// Acceptance rules for submitted images
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::from_config(&self.config.images)
    }

    /// Largest request body accepted: the image ceiling plus 1 MiB for the
    /// form fields and multipart framing
    pub fn body_limit(&self) -> usize {
        self.config.images.max_bytes.saturating_add(1024 * 1024)
    }

    /// Remove an image without making the caller wait
    pub fn discard_image(&self, location: String) {
        let images = self.images.clone();
        tokio::spawn(async move {
            images.delete(&location).await;
        });
    }
}
