//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::attachments::{self, ImageStore};
use crate::config::AppConfig;
use crate::core::service::RequestStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the procurement HTTP server
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_env()?;
/// let store = storage::open(&config.database).await?;
///
/// ServerBuilder::new()
///     .with_config(config)
///     .with_store_arc(store)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn RequestStore>>,
    images: Option<Arc<dyn ImageStore>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            images: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the record store (required)
    pub fn with_store(self, store: impl RequestStore + 'static) -> Self {
        self.with_store_arc(Arc::new(store))
    }

    pub fn with_store_arc(mut self, store: Arc<dyn RequestStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the image store
    ///
    /// Defaults to the backend named in `images.backend`.
    pub fn with_image_store(mut self, images: impl ImageStore + 'static) -> Self {
        self.images = Some(Arc::new(images));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the request API, such as a QR code
    /// generator for the submission form.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the shared host
    ///
    /// Fails when the configuration is invalid or no store was given.
    pub fn build_host(mut self) -> Result<ServerHost> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("RequestStore is required. Call .with_store()"))?;

        let images = match self.images.take() {
            Some(images) => images,
            None => attachments::open(&self.config.images)?,
        };

        tracing::info!(
            store = store.backend(),
            images = images.backend(),
            "procurement host ready"
        );

        Ok(ServerHost::new(self.config, store, images))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to `server.host:server.port`
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.address();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}


/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
