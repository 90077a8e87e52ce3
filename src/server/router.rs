//! Routes for the HTML pages, static assets and local uploads

use crate::config::{AppConfig, ImageBackend};
use axum::Router;
use axum::routing::get_service;
use tower_http::services::{ServeDir, ServeFile};

/// Pages served at fixed paths, relative to `server.static_dir`
pub const PAGES: [(&str, &str); 3] = [
    ("/", "index.html"),
    ("/request", "request-form.html"),
    ("/requests", "requests.html"),
];

/// Build the non-API routes
///
/// - `/`, `/request`, `/requests` map to their HTML pages
/// - local uploads are served under `images.public_prefix`
/// - anything else falls through to the static directory
pub fn build_static_routes(config: &AppConfig) -> Router {
    let static_dir = &config.server.static_dir;

    let mut router = PAGES.iter().fold(Router::new(), |router, (path, file)| {
        router.route(path, get_service(ServeFile::new(static_dir.join(file))))
    });

    if config.images.backend == ImageBackend::Local {
        let prefix = config.images.public_prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            router = router.nest_service(prefix, ServeDir::new(&config.images.local_dir));
        }
    }

    router.fallback_service(ServeDir::new(static_dir))
}
