//! Shared test harness for record store and REST API testing
//!
//! Provides submission builders, a contract suite any `RequestStore` must
//! pass (`request_store_tests!`) and an HTTP suite run against the full
//! router (`rest_api_tests!`).
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! request_store_tests!(InMemoryRequestStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod rest_tests;

use procurement::core::error::{EntityError, ProcurementError, ValidationError};
use procurement::entities::{Category, NewRequest, Priority, ProcurementRequest};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Minimal valid submission
pub fn submission(item: &str, requestor: &str) -> NewRequest {
    NewRequest {
        item_name_en: item.to_string(),
        requestor_name: requestor.to_string(),
        ..Default::default()
    }
}

/// Submission with the fields used by filters and search
pub fn submission_for(
    item: &str,
    department: &str,
    category: Category,
    priority: Priority,
) -> NewRequest {
    NewRequest {
        category: Some(category),
        priority: Some(priority),
        department: department.to_string(),
        ..submission(item, "Amy")
    }
}

/// Pause long enough for the clock to move past the previous timestamp
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

// ---------------------------------------------------------------------------
// Assertions helpers
// ---------------------------------------------------------------------------

/// Assert that a store error is `NotFound` for `id`
pub fn assert_not_found(err: ProcurementError, expected: uuid::Uuid) {
    match err {
        ProcurementError::Entity(EntityError::NotFound { id }) => assert_eq!(id, expected),
        other => panic!("Expected NotFound({}), got {:?}", expected, other),
    }
}

/// Assert that a store error is a validation failure
pub fn assert_validation(err: ProcurementError) -> ValidationError {
    match err {
        ProcurementError::Validation(e) => e,
        other => panic!("Expected a validation error, got {:?}", other),
    }
}

/// Item names in list order
pub fn item_names(requests: &[ProcurementRequest]) -> Vec<&str> {
    requests.iter().map(|r| r.item_name_en.as_str()).collect()
}

// ---------------------------------------------------------------------------
// HTTP test application
// ---------------------------------------------------------------------------

/// Image ceiling used by the HTTP suite
pub const TEST_MAX_IMAGE_BYTES: usize = 1024;

/// Full router over `store`, with uploads and pages in a temporary directory
pub struct TestApp {
    pub server: axum_test::TestServer,
    pub root: tempfile::TempDir,
}

impl TestApp {
    pub fn new(store: impl procurement::core::service::RequestStore + 'static) -> Self {
        let root = tempfile::tempdir().unwrap();

        let mut config = procurement::config::AppConfig::default();
        config.server.static_dir = root.path().join("pages");
        config.images.local_dir = root.path().join("uploads");
        config.images.max_bytes = TEST_MAX_IMAGE_BYTES;

        let router = procurement::server::ServerBuilder::new()
            .with_config(config)
            .with_store(store)
            .build()
            .expect("router should build");

        Self {
            server: axum_test::TestServer::new(router),
            root,
        }
    }

    pub fn uploads(&self) -> std::path::PathBuf {
        self.root.path().join("uploads")
    }

    /// Number of files in the upload directory
    pub fn stored_images(&self) -> usize {
        std::fs::read_dir(self.uploads())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// File behind an `imagePath` returned by the API
    pub fn image_file(&self, image_path: &str) -> std::path::PathBuf {
        let name = image_path.rsplit('/').next().unwrap();
        self.uploads().join(name)
    }
}

/// A small JPEG-looking payload
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len.max(4), 0x42);
    bytes
}

/// Wait until `path` disappears, for work finished in the background
pub async fn wait_until_removed(path: &std::path::Path) -> bool {
    for _ in 0..50 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !path.exists()
}
