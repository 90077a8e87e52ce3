//! REST API exposure
//!
//! Consumes a `ServerHost` and produces the Axum `Router` serving the JSON
//! API, the health probe, the HTML pages and locally stored uploads.

use super::super::handlers::{
    create_request, delete_request, get_request, health_check, list_requests, update_request,
};
use super::super::host::ServerHost;
use crate::server::router::build_static_routes;
use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with:
    /// - `/api/requests` and `/api/requests/{id}` CRUD routes
    /// - `/api/health`
    /// - Custom routes
    /// - HTML pages, static assets and local uploads
    ///
    /// Requests are traced, CORS is permissive and bodies are capped at
    /// [`ServerHost::body_limit`].
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let body_limit = host.body_limit();

        let mut app = Self::api_routes(host.clone());

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app = app.merge(build_static_routes(&host.config));

        Ok(app
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http()))
    }

    fn api_routes(host: Arc<ServerHost>) -> Router {
        Router::new()
            .route("/api/health", get(health_check))
            .route("/api/requests", get(list_requests).post(create_request))
            .route(
                "/api/requests/{id}",
                get(get_request).patch(update_request).delete(delete_request),
            )
            .with_state(host)
    }
}
